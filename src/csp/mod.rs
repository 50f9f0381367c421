// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The CSP directive model: options, directives, the policy map, and
//! violation reports. This is the typed, bidirectionally-convertible
//! representation every other component builds on.

pub mod directive;
pub mod option;
pub mod policy;
pub mod violation;

pub use directive::{Directive, DirectiveValue, Family, OptionKind};
pub use option::{ArbitraryTextOption, MimeTypeOption, SandboxOption, SourceOption};
pub use policy::Policy;
pub use violation::ViolationReport;
