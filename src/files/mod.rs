//! File operations module for Folio
//!
//! Native system dialogs used by the shell.

pub mod dialogs;
