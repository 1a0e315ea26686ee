//! Resume markers and per-procedure label enums

use std::convert::Infallible;
use std::num::NonZeroU32;

/// Opaque resume marker stored in a frame slot.
///
/// A marker is only meaningful to the procedure that recorded it; it is
/// decoded back into that procedure's label enum on the next entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResumePoint(NonZeroU32);

impl ResumePoint {
    /// Marker for the `index`-th label of a procedure
    pub const fn from_index(index: u32) -> Self {
        ResumePoint(NonZeroU32::MIN.saturating_add(index))
    }

    /// Build a marker from its raw value (zero is not a marker)
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(raw) => Some(ResumePoint(raw)),
            None => None,
        }
    }

    /// Raw, non-zero value
    pub const fn raw(self) -> u32 {
        self.0.get()
    }

    /// Index of the label this marker was built from
    pub const fn index(self) -> u32 {
        self.0.get() - 1
    }
}

/// The set of suspension points of one resumable procedure.
///
/// Implement it with [`resume_labels!`](crate::resume_labels) rather than by
/// hand.
pub trait ResumeLabel: Copy + Sized {
    /// Encode this label as a marker
    fn point(self) -> ResumePoint;

    /// Decode a marker, `None` if it is not one of this procedure's labels
    fn from_point(point: ResumePoint) -> Option<Self>;
}

/// Label set of procedures that never suspend
impl ResumeLabel for Infallible {
    fn point(self) -> ResumePoint {
        match self {}
    }

    fn from_point(_point: ResumePoint) -> Option<Self> {
        None
    }
}

/// Declare the suspension points of a procedure.
///
/// Expands to a fieldless enum deriving `Debug, Copy, Clone, PartialEq, Eq`
/// and an implementation of [`ResumeLabel`].
///
/// ```ignore
/// resume_labels! {
///     enum At { Sleeping, Draining }
/// }
/// ```
#[macro_export]
macro_rules! resume_labels {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::ResumeLabel for $name {
            fn point(self) -> $crate::ResumePoint {
                $crate::ResumePoint::from_index(self as u32)
            }

            fn from_point(point: $crate::ResumePoint) -> ::core::option::Option<Self> {
                const ALL: &[$name] = &[$($name::$variant),+];
                ALL.get(point.index() as usize).copied()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    resume_labels! {
        enum Probe { First, Second, Third }
    }

    #[test]
    fn test_labels_decode_to_themselves() {
        for label in [Probe::First, Probe::Second, Probe::Third] {
            assert_eq!(Probe::from_point(label.point()), Some(label));
        }
    }

    #[test]
    fn test_marker_is_never_zero() {
        assert_eq!(Probe::First.point().raw(), 1);
        assert_eq!(ResumePoint::from_raw(0), None);
    }

    #[test]
    fn test_foreign_marker_is_rejected() {
        let foreign = ResumePoint::from_index(12);
        assert_eq!(Probe::from_point(foreign), None);
        assert_eq!(Infallible::from_point(foreign), None);
    }
}
