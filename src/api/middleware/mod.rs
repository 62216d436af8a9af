//! Request middleware. Only access logging; the admin gate is checked in
//! the admin handlers because it drives page flow, not just rejection.

pub mod access;
