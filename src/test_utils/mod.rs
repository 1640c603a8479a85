#![allow(missing_docs)]

pub(crate) mod fake_api;
pub(crate) mod html;
pub(crate) mod region;
pub(crate) mod temp_log;

pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use region::{assert_alert, assert_hx_attribute, must_get_element};
pub(crate) use temp_log::TempLog;
