//! Ring Road Traffic Simulation Library
//!
//! A cellular automaton traffic simulation comparing adaptive cruise control
//! vehicles against human drivers on two independent circular roads.

pub mod simulation;
