use std::fmt;

#[derive(Debug)]
pub enum Error {
    EmptyIndex,
    NotFound(String),
    DuplicateName(String),
    Parse { line: String, reason: String },
    Config(String),
    Json(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        match self {
            Error::EmptyIndex => write!(f, "no employees in the index"),
            Error::NotFound(name) => write!(f, "Employee not found: {}", name),
            Error::DuplicateName(name) => write!(f, "an employee named {} already exists", name),
            Error::Parse { line, reason } => write!(f, "could not parse {:?}: {}", line, reason),
            Error::Config(msg) => write!(f, "bad config: {}", msg),
            Error::Json(msg) => write!(f, "json error: {}", msg),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for Error {

    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {

        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::convert::From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl std::convert::From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Error {
        Error::Config(e.to_string())
    }
}

impl std::convert::From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json(e.to_string())
    }
}
