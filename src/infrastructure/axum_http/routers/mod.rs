pub mod billing;
pub mod captain_signoff;
pub mod testimonial_snapshots;
pub mod vessel_claims;
