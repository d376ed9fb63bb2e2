//! Input shapes understood by the [`Validator`](crate::Validator).
//!
//! Every input is reduced to one of a closed set of shapes: an absent value,
//! a record, one level of indirection, a sequence, or anything else.
//!
//! Absent values and null pointers are treated differently:
//! - `Option<T>::None` is an absent value and is vacuously valid.
//! - `Option<Box<T>>::None` (likewise `Arc`, `Rc`) is a null pointer and
//!   validates the zero value of `T`, the same as a pointer to a zero record.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use validate_rules::Record;

/// Normalized view of a value for validation dispatch.
pub enum Shape<'a> {
    /// No value at all.
    Nil,
    /// A record evaluated by the rule engine.
    Record(&'a dyn Record),
    /// One level of indirection to another value.
    Pointer(&'a dyn Validatable),
    /// A null pointer, carrying the zero value of its pointee.
    NullPointer(Box<dyn Validatable>),
    /// Elements validated independently, in order.
    Sequence(Box<dyn Iterator<Item = &'a dyn Validatable> + 'a>),
    /// Primitives, strings, maps: never structurally validated.
    Other,
}

/// A value the [`Validator`](crate::Validator) can dispatch on.
///
/// Record types implement this with [`validatable!`](crate::validatable).
pub trait Validatable {
    fn shape(&self) -> Shape<'_>;

    /// Shape of a missing value of this type, used by `Option<Self>::None`.
    fn absent<'a>() -> Shape<'a>
    where
        Self: Sized,
    {
        Shape::Nil
    }

    /// Zero value validated in place of a null pointer to this type.
    ///
    /// `None` when the type has no zero value; a null pointer to it is then
    /// treated as an absent value.
    fn zero() -> Option<Box<dyn Validatable>>
    where
        Self: Sized,
    {
        None
    }
}

/// Implement [`Validatable`] for [`Record`] types.
///
/// The zero value of a listed type is its [`Default`]. Types without one are
/// listed after `without_zero:`.
///
/// ```
/// use grpc_validate::{Field, Record, validatable};
///
/// #[derive(Default)]
/// struct Ping {
///     id: String,
/// }
///
/// struct Token<'a> {
///     value: &'a str,
/// }
///
/// impl Record for Ping {
///     fn fields(&self) -> Vec<Field<'_>> {
///         vec![Field::new("Id", &self.id).rules("required")]
///     }
/// }
///
/// impl Record for Token<'_> {
///     fn fields(&self) -> Vec<Field<'_>> {
///         vec![Field::new("Value", self.value).rules("required")]
///     }
/// }
///
/// validatable!(Ping);
/// validatable!(without_zero: Token<'_>);
/// ```
#[macro_export]
macro_rules! validatable {
    (without_zero: $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Validatable for $ty {
                fn shape(&self) -> $crate::Shape<'_> {
                    $crate::Shape::Record(self)
                }
            }
        )+
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Validatable for $ty {
                fn shape(&self) -> $crate::Shape<'_> {
                    $crate::Shape::Record(self)
                }

                fn zero() -> ::std::option::Option<::std::boxed::Box<dyn $crate::Validatable>> {
                    ::std::option::Option::Some(::std::boxed::Box::new(
                        <$ty as ::std::default::Default>::default(),
                    ))
                }
            }
        )+
    };
}

impl<T: Validatable> Validatable for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => T::absent(),
        }
    }
}

/// Null pointer to `T`: its zero value, or an absent value if it has none.
fn null_pointer<'a, T: Validatable>() -> Shape<'a> {
    T::zero().map_or(Shape::Nil, Shape::NullPointer)
}

impl<T: Validatable> Validatable for Box<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Pointer(&**self)
    }

    fn absent<'a>() -> Shape<'a> {
        null_pointer::<T>()
    }
}

impl<T: Validatable> Validatable for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Pointer(&**self)
    }

    fn absent<'a>() -> Shape<'a> {
        null_pointer::<T>()
    }
}

impl<T: Validatable> Validatable for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Pointer(&**self)
    }

    fn absent<'a>() -> Shape<'a> {
        null_pointer::<T>()
    }
}

// A plain reference is how values are passed, not a pointer field.
impl<T: Validatable + ?Sized> Validatable for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Validatable> Validatable for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(Box::new(self.iter().map(|e| e as &dyn Validatable)))
    }
}

impl<T: Validatable, const N: usize> Validatable for [T; N] {
    fn shape(&self) -> Shape<'_> {
        self.as_slice().shape()
    }
}

impl<T: Validatable> Validatable for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        self.as_slice().shape()
    }
}

impl<T: Validatable> Validatable for VecDeque<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(Box::new(self.iter().map(|e| e as &dyn Validatable)))
    }
}

impl<T: Validatable> Validatable for tonic::Request<T> {
    fn shape(&self) -> Shape<'_> {
        self.get_ref().shape()
    }
}

macro_rules! other_shape {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Validatable for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Other
                }
            }
        )+
    };
}

other_shape!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    str,
    String,
);

impl<K, V, S> Validatable for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Other
    }
}

impl<K, V> Validatable for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Other
    }
}

impl<T, S> Validatable for HashSet<T, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Other
    }
}

impl<T> Validatable for BTreeSet<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Other
    }
}
