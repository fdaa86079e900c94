//! Replay tokens: compact coordinates of a failing example.
//!
//! A token holds the generator parameters that produced the failing
//! iteration and the path of subspace indices to the failing node. It is
//! encoded as URL-safe base64 over JSON so it can be pasted into a test.

use crate::data::{GenParameters, Seed, Size};
use crate::error::{LodestarError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

const TOKEN_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayToken {
    pub version: u8,
    pub seed: (u64, u64),
    pub size: usize,
    pub path: Vec<usize>,
}

impl ReplayToken {
    pub fn new(params: GenParameters, path: Vec<usize>) -> Self {
        ReplayToken {
            version: TOKEN_VERSION,
            seed: (params.seed.0, params.seed.1),
            size: params.size.get(),
            path,
        }
    }

    /// The parameters that reproduce the recorded iteration.
    pub fn params(&self) -> GenParameters {
        GenParameters::new(Seed(self.seed.0, self.seed.1), Size::new(self.size))
    }

    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self).map_err(|e| LodestarError::MalformedReplay {
            reason: e.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a token. Never panics; malformed input is an error.
    pub fn decode(token: &str) -> Result<Self> {
        let malformed = |reason: String| LodestarError::MalformedReplay { reason };

        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| malformed(format!("invalid base64: {e}")))?;
        let decoded: ReplayToken =
            serde_json::from_slice(&bytes).map_err(|e| malformed(format!("invalid contents: {e}")))?;

        if decoded.version != TOKEN_VERSION {
            return Err(malformed(format!(
                "unsupported version {} (expected {TOKEN_VERSION})",
                decoded.version
            )));
        }
        if decoded.size > Size::MAX.get() {
            return Err(malformed(format!("size {} is out of range", decoded.size)));
        }

        Ok(decoded)
    }
}
