pub mod lti_ags_line_item;
pub mod lti_ags_score;
pub mod lti_configuration;
