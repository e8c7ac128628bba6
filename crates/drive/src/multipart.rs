//! Upload modes and `multipart/related` upload bodies
//!
//! Small files go up in a single request whose body holds a JSON part
//! followed by the raw bytes. Anything larger uses a resumable session: the
//! metadata opens the session and the bytes are sent to its location.

use serde::Serialize;

/// Largest payload accepted by `uploadType=multipart`: 5 MiB
pub const MULTIPART_MAX_BYTES: usize = 5 * 1024 * 1024;

/// How a file's content is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// One `multipart/related` request
    Multipart,
    /// Open a session, then `PUT` the bytes to it
    Resumable,
}

impl UploadMode {
    /// Pick the mode for a payload of `len` bytes
    pub fn for_size(len: usize) -> Self {
        if len <= MULTIPART_MAX_BYTES {
            Self::Multipart
        } else {
            Self::Resumable
        }
    }

    /// Value of the `uploadType` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Multipart => "multipart",
            Self::Resumable => "resumable",
        }
    }
}

/// Metadata part of a new file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub parents: [&'a str; 1],
}

/// An encoded upload body and its content type header
#[derive(Debug)]
pub struct RelatedBody {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Boundary unlikely to appear in the payload
fn boundary() -> String {
    format!("gdc-boundary-{}", jiff::Timestamp::now().as_nanosecond())
}

/// Encode metadata and content as `multipart/related`
pub fn related(metadata: &NewFile<'_>, content: &[u8]) -> serde_json::Result<RelatedBody> {
    encode(&boundary(), metadata, content)
}

fn encode(boundary: &str, metadata: &NewFile<'_>, content: &[u8]) -> serde_json::Result<RelatedBody> {
    let json = serde_json::to_vec(metadata)?;

    let mut body = Vec::with_capacity(json.len() + content.len() + 4 * boundary.len() + 128);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(&json);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", metadata.mime_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Ok(RelatedBody {
        content_type: format!("multipart/related; boundary={boundary}"),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_mode_threshold() {
        assert_eq!(UploadMode::for_size(0), UploadMode::Multipart);
        assert_eq!(UploadMode::for_size(MULTIPART_MAX_BYTES), UploadMode::Multipart);
        assert_eq!(UploadMode::for_size(MULTIPART_MAX_BYTES + 1), UploadMode::Resumable);
        assert_eq!(UploadMode::for_size(64 * 1024 * 1024).as_str(), "resumable");
    }

    #[test]
    fn test_body_layout() {
        let metadata = NewFile {
            name: "a.txt",
            mime_type: "text/plain",
            parents: ["p1"],
        };
        let encoded = encode("XYZ", &metadata, b"hello").unwrap();

        assert_eq!(encoded.content_type, "multipart/related; boundary=XYZ");
        let expected = "--XYZ\r\n\
            Content-Type: application/json; charset=UTF-8\r\n\r\n\
            {\"name\":\"a.txt\",\"mimeType\":\"text/plain\",\"parents\":[\"p1\"]}\r\n\
            --XYZ\r\n\
            Content-Type: text/plain\r\n\r\n\
            hello\r\n\
            --XYZ--\r\n";
        assert_eq!(String::from_utf8(encoded.body).unwrap(), expected);
    }

    #[test]
    fn test_binary_content_kept_verbatim() {
        let metadata = NewFile {
            name: "b.bin",
            mime_type: "application/octet-stream",
            parents: ["root"],
        };
        let content = [0u8, 255, 13, 10, 45, 45];
        let encoded = related(&metadata, &content).unwrap();
        assert!(
            encoded
                .body
                .windows(content.len())
                .any(|window| window == content)
        );
    }
}
