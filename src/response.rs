// Response shapes returned to callers
//
// Both shapes are served with HTTP 200; callers branch on `status`.

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::image_optimizer::EncodedPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Compressed JPEG size in KiB, one decimal place
    pub size_kb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessBody {
    pub status: Status,
    /// `data:image/jpeg;base64,...` URI
    pub base64_image: String,
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureBody {
    pub error: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GatewayResponse {
    Success(SuccessBody),
    Failure(FailureBody),
}

impl GatewayResponse {
    pub fn success(payload: EncodedPayload) -> Self {
        let size_kb = round_one_decimal(payload.size_kb());
        GatewayResponse::Success(SuccessBody {
            status: Status::Success,
            base64_image: payload.data_uri,
            meta: ResponseMeta { size_kb },
        })
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        GatewayResponse::Failure(FailureBody {
            error: error.to_string(),
            status: Status::Failed,
        })
    }

    pub fn from_result(result: Result<EncodedPayload, GatewayError>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(e) => Self::failure(e),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            GatewayResponse::Success(body) => body.status,
            GatewayResponse::Failure(body) => body.status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == Status::Success
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
