pub mod captain_signoff;
pub mod plan_change;
pub mod testimonial_snapshots;
pub mod vessel_claims;
