//! Response content decoding
//!
//! Queries advertise `Accept-Encoding: gzip, deflate`, so the body may come
//! back compressed. The `Content-Encoding` header picks the decoder.

use crate::error::{KustoError, Result};
use flate2::read::{DeflateDecoder, GzDecoder};
use std::io::Read;

/// Supported `Content-Encoding` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Gzip,
    Deflate,
}

impl ContentEncoding {
    /// Header value is matched case-insensitively; a missing or empty header is identity
    pub fn from_header(value: Option<&str>) -> Result<Self> {
        let value = value.unwrap_or("").trim().to_ascii_lowercase();
        match value.as_str() {
            "" => Ok(ContentEncoding::Identity),
            "gzip" => Ok(ContentEncoding::Gzip),
            "deflate" => Ok(ContentEncoding::Deflate),
            other => Err(KustoError::encoding(
                format!("Content-Encoding was unrecognized: {}", other),
                None,
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Identity => "",
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Deflate => "deflate",
        }
    }

    /// Decode `body` to completion
    pub fn decode(&self, body: Vec<u8>) -> Result<Vec<u8>> {
        match self {
            ContentEncoding::Identity => Ok(body),
            ContentEncoding::Gzip => read_all(GzDecoder::new(body.as_slice()), "gzip reader error"),
            ContentEncoding::Deflate => {
                read_all(DeflateDecoder::new(body.as_slice()), "deflate reader error")
            }
        }
    }
}

fn read_all(mut reader: impl Read, context: &str) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    reader
        .read_to_end(&mut decoded)
        .map_err(|e| KustoError::encoding(format!("{}: {}", context, e), Some(e)))?;
    Ok(decoded)
}
