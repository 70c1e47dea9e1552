/// Formats a message and registers it, returning its [`Index`](crate::Index).
///
/// Works with anything exposing `new_errorf`: a [`Module`](crate::Module)
/// or a [`Registry`](crate::Registry).
///
/// # Examples
///
/// ```
/// use error_index::{errorf, Registry};
///
/// let registry = Registry::new();
/// let billing = registry.register_module("billing");
///
/// let idx = errorf!(billing, "invoice {} not found", 42);
/// assert_eq!(
///     registry.index_string(idx),
///     "Module[billing]: invoice 42 not found"
/// );
/// ```
#[macro_export]
macro_rules! errorf {
    ($module:expr, $($arg:tt)*) => {
        $module.new_errorf(::core::format_args!($($arg)*))
    };
}
