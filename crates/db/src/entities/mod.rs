//! `SeaORM` entity definitions.
//!
//! One module per table; field names mirror the column names.

#![allow(missing_docs)]

pub mod archery_arrows;
pub mod archery_ends;
pub mod archery_games;
pub mod assessment_types;
pub mod assessments;
pub mod cashbook_entries;
pub mod dues;
pub mod member_tariffs;
pub mod members;
pub mod organizations;
pub mod tariffs;
pub mod users;
