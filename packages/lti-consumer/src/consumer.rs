pub mod ags;
pub mod constants;
pub mod lti_1p1;
pub mod lti_1p3;
pub mod oauth;

pub use lti_1p1::LtiConsumer1p1;
pub use lti_1p3::LtiAdvantageConsumer;

use crate::entity::lti_configuration::LtiVersion;

/// A protocol consumer selected from a configuration's version.
pub enum LtiConsumer {
    Lti1p1(LtiConsumer1p1),
    Lti1p3(Box<LtiAdvantageConsumer>),
}

impl LtiConsumer {
    pub fn version(&self) -> LtiVersion {
        match self {
            LtiConsumer::Lti1p1(_) => LtiVersion::Lti1p1,
            LtiConsumer::Lti1p3(_) => LtiVersion::Lti1p3,
        }
    }

    pub fn as_lti_1p1(&self) -> Option<&LtiConsumer1p1> {
        match self {
            LtiConsumer::Lti1p1(consumer) => Some(consumer),
            LtiConsumer::Lti1p3(_) => None,
        }
    }

    pub fn as_lti_1p3(&self) -> Option<&LtiAdvantageConsumer> {
        match self {
            LtiConsumer::Lti1p3(consumer) => Some(&**consumer),
            LtiConsumer::Lti1p1(_) => None,
        }
    }

    pub fn as_lti_1p3_mut(&mut self) -> Option<&mut LtiAdvantageConsumer> {
        match self {
            LtiConsumer::Lti1p3(consumer) => Some(&mut **consumer),
            LtiConsumer::Lti1p1(_) => None,
        }
    }
}
