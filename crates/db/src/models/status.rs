//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The lookup table `name` column for this status.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Spot confirmation lifecycle status.
    ConfirmationStatus {
        Unassigned = 1 => "unassigned",
        Pending = 2 => "pending",
        Confirmed = 3 => "confirmed",
        Declined = 4 => "declined",
        Expired = 5 => "expired",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_core::spot_lifecycle::state_machine;

    #[test]
    fn ids_match_core_state_machine() {
        assert_eq!(ConfirmationStatus::Unassigned.id(), state_machine::UNASSIGNED);
        assert_eq!(ConfirmationStatus::Pending.id(), state_machine::PENDING);
        assert_eq!(ConfirmationStatus::Confirmed.id(), state_machine::CONFIRMED);
        assert_eq!(ConfirmationStatus::Declined.id(), state_machine::DECLINED);
        assert_eq!(ConfirmationStatus::Expired.id(), state_machine::EXPIRED);
    }

    #[test]
    fn labels_match_core_names() {
        for id in 1..=5 {
            let status = ConfirmationStatus::from_id(id).unwrap();
            assert_eq!(status.as_str(), state_machine::status_name(id));
        }
        assert_eq!(ConfirmationStatus::from_id(0), None);
    }
}
