use std::fmt::{Display, Formatter, Result};

#[derive(Debug)]
pub enum Error {
  ReqwestError(reqwest::Error),
  JsonError(serde_json::Error),
  IoError(std::io::Error),
  TemplateError(indicatif::style::TemplateError),
  CatalogError(String),
  MalformedDatasetError(String),
  MissingDatasetIdError(String),
}

impl std::error::Error for Error {}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Error::ReqwestError(e) => std::fmt::Display::fmt(e, f),
      Error::JsonError(e) => std::fmt::Display::fmt(e, f),
      Error::IoError(e) => std::fmt::Display::fmt(e, f),
      Error::TemplateError(e) => std::fmt::Display::fmt(e, f),
      Error::CatalogError(e) => std::fmt::Display::fmt(e, f),
      Error::MalformedDatasetError(e) => std::fmt::Display::fmt(e, f),
      Error::MissingDatasetIdError(e) => std::fmt::Display::fmt(e, f),
    }
  }
}

impl From<reqwest::Error> for Error {
  fn from(reqwest_error: reqwest::Error) -> Self {
    Error::ReqwestError(reqwest_error)
  }
}

impl From<serde_json::Error> for Error {
  fn from(serde_json_error: serde_json::Error) -> Self {
    Error::JsonError(serde_json_error)
  }
}

impl From<std::io::Error> for Error {
  fn from(io_error: std::io::Error) -> Self {
    Error::IoError(io_error)
  }
}

impl From<indicatif::style::TemplateError> for Error {
  fn from(template_error: indicatif::style::TemplateError) -> Self {
    Error::TemplateError(template_error)
  }
}
