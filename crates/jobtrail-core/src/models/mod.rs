//! Data models for jobtrail

mod application;
mod company;
mod contact;
mod goal;
mod prep;
mod record;
mod referral;
mod story;

pub use application::{Application, ApplicationStatus};
pub use company::CompanyResearch;
pub use contact::{ContactStatus, NetworkingContact};
pub use goal::Goal;
pub use prep::{PrepEntry, CONFIDENCE_MAX, CONFIDENCE_MIN};
pub use record::{Payload, Record, RecordId};
pub use referral::Referral;
pub use story::StarStory;
