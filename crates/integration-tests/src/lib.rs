//! Integration tests for Farmstellar.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply the schema
//! cargo run -p farmstellar-cli -- migrate
//! cargo run -p farmstellar-cli -- seed
//!
//! # Start the API in development mode (fixed OTP, sampleOtp in responses)
//! APP_ENV=development cargo run -p farmstellar-api
//!
//! # Run the ignored end-to-end tests
//! cargo test -p farmstellar-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - OTP issuance/verification, single-use and attempt limits
//! - `progress` - onboarding, quest progress, XP awards, leaderboard
//!
//! Tests target a running server (`API_BASE_URL`, default
//! `http://localhost:3000`) and are `#[ignore]`d so a plain `cargo test`
//! stays hermetic.
