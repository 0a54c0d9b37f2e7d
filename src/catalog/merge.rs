// Merge-by-key reconciliation
//
// Built-in defaults are overlaid with persisted partial records matched by id.
// Known ids keep the default ordering; unknown ids are appended in the order
// they were first seen in the persisted list.

use std::collections::HashMap;

/// A record addressable by a stable string id
pub trait Keyed {
    fn key(&self) -> &str;
}

/// A record that can absorb a partial copy of itself.
///
/// `Patch` carries the same id and an optional value per field; fields
/// absent from the patch keep the record's current value.
pub trait Overlay: Keyed + Default + Clone {
    type Patch: Keyed;

    fn overlay(&mut self, patch: Self::Patch);

    /// Record built from a patch alone, for ids with no default counterpart
    fn from_patch(patch: Self::Patch) -> Self {
        let mut record = Self::default();
        record.overlay(patch);
        record
    }
}

/// Overlay `persisted` onto `defaults`, matching by key.
///
/// Patches with an empty key are skipped. A key repeated in `persisted`
/// overlays the already-merged record again, so later patches win field by
/// field.
pub fn merge_by_key<T: Overlay>(defaults: &[T], persisted: Vec<T::Patch>) -> Vec<T> {
    let mut merged: Vec<T> = defaults.to_vec();
    let mut index: HashMap<String, usize> = HashMap::with_capacity(merged.len());
    for (position, record) in merged.iter().enumerate() {
        index.entry(record.key().to_string()).or_insert(position);
    }

    for patch in persisted {
        if patch.key().is_empty() {
            continue;
        }

        match index.get(patch.key()).copied() {
            Some(position) => merged[position].overlay(patch),
            None => {
                let key = patch.key().to_string();
                index.insert(key, merged.len());
                merged.push(T::from_patch(patch));
            }
        }
    }

    merged
}

/// Generates the partial companion of a catalog record together with its
/// `Keyed`, `Overlay` and `From<record>` impls.
macro_rules! overlay_patch {
    (
        $record:ident => $patch:ident {
            $( $(#[$meta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        #[doc = concat!("Partial [`", stringify!($record), "`] as read from persisted or imported blobs")]
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $patch {
            #[serde(default)]
            pub id: String,
            $(
                $(#[$meta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl $crate::catalog::merge::Keyed for $patch {
            fn key(&self) -> &str {
                &self.id
            }
        }

        impl $crate::catalog::merge::Keyed for $record {
            fn key(&self) -> &str {
                &self.id
            }
        }

        impl $crate::catalog::merge::Overlay for $record {
            type Patch = $patch;

            fn overlay(&mut self, patch: $patch) {
                self.id = patch.id;
                $(
                    if let Some(value) = patch.$field {
                        self.$field = value;
                    }
                )*
            }
        }

        impl From<$record> for $patch {
            fn from(record: $record) -> Self {
                Self {
                    id: record.id,
                    $( $field: Some(record.$field), )*
                }
            }
        }
    };
}

pub(crate) use overlay_patch;
