#[derive(Debug)]
pub enum ServerError {
    Io(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "server io error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl HttpApiError {
    fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::ValidationFailed(details) => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorBody::with_details("invalid game state", details),
            },
            StoreError::Storage(err) => {
                error!("storage failure: {err}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody::new(err.to_string()),
                }
            }
        }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
