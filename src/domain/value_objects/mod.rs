pub mod billing;
pub mod enums;
pub mod signoff;
pub mod vessel_claims;
