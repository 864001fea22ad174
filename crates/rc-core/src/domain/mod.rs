//! Domain values for device remote control.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from OS APIs, network libraries, or UI frameworks.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Here the rules are: where a click in the mirror view lands on the device
//! screen, which modifier key just changed, and what counts as a device
//! address.  The session and transport layers depend on these, never the
//! other way round.

/// Device address validation (IPv4 literal or DNS hostname).
pub mod address;

/// Mapping local pointer positions onto device pixels.
pub mod geometry;

/// Modifier flag tracking and edge detection.
pub mod modifiers;
