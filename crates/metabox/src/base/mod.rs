pub mod sanitizer;

///
/// Sanitizer
///
/// One normalization routine over a mutable value. Routines compose inside
/// type handlers; an `Err` carries the reason and the handler decides how
/// to degrade.
///

pub trait Sanitizer<T: ?Sized> {
    fn sanitize(&self, value: &mut T) -> Result<(), String>;
}
