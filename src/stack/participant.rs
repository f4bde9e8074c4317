//! Receivers and the capability traits participating types implement.
//!
//! A method frame records the receiver it was invoked on. Called through
//! `&dyn Participant` (or a generic `Self`), `class_name` reports the
//! runtime type, which is what inherited calls must show.

/// Compile-time class name of a participating type
///
/// Used by class-scoped functions, which have a type but no instance.
pub trait ClassName {
    const NAME: &'static str;
}

/// How a method call was dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    /// Normal call, resolved against the receiver's runtime type
    #[default]
    Dynamic,

    /// Explicit call of an ancestor's implementation
    ExplicitBase,
}

/// Capability interface for values that can act as a method receiver
pub trait Participant {
    /// Runtime class name of this value
    fn class_name(&self) -> &'static str;

    /// Dispatch form of calls made through this value
    fn dispatch(&self) -> Dispatch {
        Dispatch::Dynamic
    }
}

/// Marks a call as an explicit dispatch to an ancestor implementation.
///
/// Trait impls for `ExplicitBase<'_, T>` that keep the default method
/// bodies model "call the base implementation on this instance". Frames
/// entered with such a receiver report the lexically defining class.
///
/// ```ignore
/// impl BaseMethods for ExplicitBase<'_, Derived> {}
/// ExplicitBase(&derived).describe();
/// ```
#[derive(Debug)]
pub struct ExplicitBase<'a, T: ?Sized>(pub &'a T);

impl<T: Participant + ?Sized> Participant for ExplicitBase<'_, T> {
    fn class_name(&self) -> &'static str {
        self.0.class_name()
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::ExplicitBase
    }
}

/// What a frame was invoked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Receiver {
    /// Free function, path-only static function, or nested function
    #[default]
    None,

    /// Instance method with its receiver's runtime class
    Instance {
        class: &'static str,
        dispatch: Dispatch,
    },

    /// Class-scoped function bound to a type
    Type(&'static str),
}

impl Receiver {
    /// Receiver for an instance method call
    pub fn of<P: Participant + ?Sized>(receiver: &P) -> Self {
        Receiver::Instance {
            class: receiver.class_name(),
            dispatch: receiver.dispatch(),
        }
    }

    /// Receiver for a class-scoped call on `T`
    pub fn of_type<T: ClassName + ?Sized>() -> Self {
        Receiver::Type(T::NAME)
    }
}

/// Implement [`ClassName`] and [`Participant`] for one or more types,
/// using each type's own identifier as its class name.
#[macro_export]
macro_rules! participant {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $crate::stack::ClassName for $ty {
                const NAME: &'static str = stringify!($ty);
            }

            impl $crate::stack::Participant for $ty {
                fn class_name(&self) -> &'static str {
                    stringify!($ty)
                }
            }
        )+
    };
}
