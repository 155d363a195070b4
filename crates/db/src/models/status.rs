//! Status ids mapping to the SMALLINT lookup tables.
//!
//! Discriminants match the seed data in the `*_statuses` tables.

use questlog_core::quest::{ProjectStatus, QuestStatus};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_ids {
    (
        $(#[$meta:meta])*
        $domain:ident {
            $( $variant:ident = $val:literal ),+ $(,)?
        }
        $fn_to:ident, $fn_from:ident
    ) => {
        $(#[$meta])*
        pub fn $fn_to(status: $domain) -> StatusId {
            match status {
                $( $domain::$variant => $val ),+
            }
        }

        /// Unknown ids fall back to the first (initial) state.
        pub fn $fn_from(id: StatusId) -> $domain {
            match id {
                $( $val => $domain::$variant, )+
                other => {
                    tracing::warn!(status_id = other, kind = stringify!($domain), "Unknown status id");
                    define_status_ids!(@first $domain $( $variant )+)
                }
            }
        }
    };
    (@first $domain:ident $first:ident $( $rest:ident )*) => {
        $domain::$first
    };
}

define_status_ids! {
    /// Database id of a quest status.
    QuestStatus {
        Pending = 1,
        Active = 2,
        Completed = 3,
    }
    quest_status_id, quest_status_from_id
}

define_status_ids! {
    /// Database id of a project status.
    ProjectStatus {
        Active = 1,
        Completed = 2,
    }
    project_status_id, project_status_from_id
}
