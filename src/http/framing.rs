//! HTTP/1.x response head parsing and body framing rules.
//!
//! A raw exchange writes opaque bytes, so the response coming back is the
//! only structured thing on the connection. The head is parsed with
//! [`httparse`]; body length follows the RFC 7230 section 3.3.3 rules, keyed
//! to the method of the request that elicited the response.

use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Version};

use crate::base::WireError;

/// Hard cap on the size of a response head (status line + headers).
pub(crate) const MAX_HEAD_BYTES: usize = 1024 * 1024;

/// Maximum number of headers accepted in a response head.
pub(crate) const MAX_HEADERS: usize = 128;

/// Longest chunk size line (hex digits plus extensions) we will buffer.
const MAX_CHUNK_LINE: usize = 4096;

/// A parsed response head.
#[derive(Debug)]
pub(crate) struct ResponseHead {
    pub status: StatusCode,
    pub version: Version,
    pub reason: Option<String>,
    pub headers: HeaderMap,
}

/// Try to parse a response head from the front of `buf`.
///
/// Returns `Ok(None)` when the head is not yet complete, otherwise the head
/// and the number of bytes it occupied.
pub(crate) fn parse_head(buf: &[u8]) -> Result<Option<(ResponseHead, usize)>, WireError> {
    let mut storage = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parsed = httparse::Response::new(&mut storage);
    let consumed = match parsed.parse(buf) {
        Ok(httparse::Status::Complete(n)) => n,
        Ok(httparse::Status::Partial) => {
            if buf.len() >= MAX_HEAD_BYTES {
                return Err(WireError::parse("response head exceeds size cap"));
            }
            return Ok(None);
        }
        Err(e) => return Err(WireError::parse(format!("response head: {e}"))),
    };

    let code = parsed
        .code
        .ok_or_else(|| WireError::parse("status line missing code"))?;
    let status = StatusCode::from_u16(code)
        .map_err(|_| WireError::parse(format!("status code {code} out of range")))?;
    let version = match parsed.version {
        Some(0) => Version::HTTP_10,
        Some(1) => Version::HTTP_11,
        _ => return Err(WireError::parse("unsupported HTTP version in status line")),
    };
    let reason = parsed.reason.map(str::to_owned);

    let mut headers = HeaderMap::with_capacity(parsed.headers.len());
    for h in parsed.headers.iter() {
        let name = HeaderName::from_bytes(h.name.as_bytes())
            .map_err(|_| WireError::parse(format!("invalid header name {:?}", h.name)))?;
        let value = HeaderValue::from_bytes(h.value)
            .map_err(|_| WireError::parse(format!("invalid value for header {}", h.name)))?;
        // append keeps wire order and multi-valued headers intact
        headers.append(name, value);
    }

    Ok(Some((
        ResponseHead {
            status,
            version,
            reason,
            headers,
        },
        consumed,
    )))
}

/// Best-effort extraction of the method token from a handwritten request
/// payload.
///
/// The raw envelope's own method is the dispatch sentinel, so the method
/// governing response framing has to come from the first token of the wire
/// bytes. A payload that does not open with a valid token yields `None` and
/// framing falls back to status and header rules alone.
pub(crate) fn payload_method(payload: &[u8]) -> Option<Method> {
    let end = payload.iter().position(|&b| b == b' ')?;
    if end == 0 || end > 32 {
        return None;
    }
    Method::from_bytes(&payload[..end]).ok()
}

/// How the response body is delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyFraming {
    /// No body bytes follow the head.
    None,
    /// Exactly this many bytes follow.
    ContentLength(u64),
    /// Chunked transfer coding until the terminal zero chunk.
    Chunked,
    /// Body runs until the peer closes the connection.
    ReadToEnd,
}

/// Decide body framing for a response elicited by `method`.
pub(crate) fn body_framing(
    method: Option<&Method>,
    head: &ResponseHead,
) -> Result<BodyFraming, WireError> {
    if method == Some(&Method::HEAD) {
        return Ok(BodyFraming::None);
    }
    let status = head.status;
    if status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
    {
        return Ok(BodyFraming::None);
    }
    if method == Some(&Method::CONNECT) && status.is_success() {
        return Ok(BodyFraming::None);
    }
    if is_chunked(&head.headers) {
        return Ok(BodyFraming::Chunked);
    }
    if let Some(len) = content_length(&head.headers)? {
        return Ok(BodyFraming::ContentLength(len));
    }
    Ok(BodyFraming::ReadToEnd)
}

/// Whether the final transfer coding is `chunked`.
fn is_chunked(headers: &HeaderMap) -> bool {
    let mut last_is_chunked = false;
    for value in headers.get_all(http::header::TRANSFER_ENCODING) {
        if let Ok(s) = value.to_str() {
            for coding in s.split(',') {
                let coding = coding.trim();
                if !coding.is_empty() {
                    last_is_chunked = coding.eq_ignore_ascii_case("chunked");
                }
            }
        }
    }
    last_is_chunked
}

/// Resolve `Content-Length` across repeated headers and comma lists.
/// Identical duplicates are tolerated; disagreement is a parse error.
fn content_length(headers: &HeaderMap) -> Result<Option<u64>, WireError> {
    let mut resolved: Option<u64> = None;
    for value in headers.get_all(http::header::CONTENT_LENGTH) {
        let s = value
            .to_str()
            .map_err(|_| WireError::parse("non-ASCII Content-Length"))?;
        for part in s.split(',') {
            let n: u64 = part
                .trim()
                .parse()
                .map_err(|_| WireError::parse(format!("invalid Content-Length {part:?}")))?;
            match resolved {
                None => resolved = Some(n),
                Some(prev) if prev == n => {}
                Some(prev) => {
                    return Err(WireError::parse(format!(
                        "conflicting Content-Length values {prev} and {n}"
                    )));
                }
            }
        }
    }
    Ok(resolved)
}

/// Incremental decoder for the chunked transfer coding.
///
/// Feed wire bytes as they arrive; decoded body bytes land in the caller's
/// output buffer. Chunk extensions are ignored and trailers are consumed and
/// discarded.
#[derive(Debug)]
pub(crate) struct ChunkedDecoder {
    state: ChunkState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    /// Reading the hex size line, up to CRLF.
    Size,
    /// Reading chunk data with this many bytes left.
    Data { remaining: u64 },
    /// Expecting the CRLF that closes a chunk's data.
    DataEnd,
    /// Reading trailer lines after the terminal zero chunk.
    Trailer,
    /// Decoding finished.
    Done,
}

impl ChunkedDecoder {
    pub(crate) fn new() -> Self {
        Self {
            state: ChunkState::Size,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.state == ChunkState::Done
    }

    /// Consume as much of `input` as possible, appending decoded bytes to
    /// `out`. Returns the number of input bytes consumed; the caller drains
    /// that many and reads more from the wire when decoding is not done.
    pub(crate) fn decode(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, WireError> {
        let mut pos = 0;
        loop {
            match self.state {
                ChunkState::Size => {
                    let rest = &input[pos..];
                    let Some(nl) = rest.iter().position(|&b| b == b'\n') else {
                        if rest.len() > MAX_CHUNK_LINE {
                            return Err(WireError::parse("chunk size line too long"));
                        }
                        return Ok(pos);
                    };
                    let line = trim_crlf(&rest[..nl]);
                    let size = parse_chunk_size(line)?;
                    pos += nl + 1;
                    self.state = if size == 0 {
                        ChunkState::Trailer
                    } else {
                        ChunkState::Data { remaining: size }
                    };
                }
                ChunkState::Data { remaining } => {
                    let rest = &input[pos..];
                    if rest.is_empty() {
                        return Ok(pos);
                    }
                    let take = rest.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
                    out.extend_from_slice(&rest[..take]);
                    pos += take;
                    let left = remaining - take as u64;
                    self.state = if left == 0 {
                        ChunkState::DataEnd
                    } else {
                        ChunkState::Data { remaining: left }
                    };
                }
                ChunkState::DataEnd => {
                    let rest = &input[pos..];
                    if rest.len() < 2 {
                        return Ok(pos);
                    }
                    if &rest[..2] != b"\r\n" {
                        return Err(WireError::parse("chunk data not terminated by CRLF"));
                    }
                    pos += 2;
                    self.state = ChunkState::Size;
                }
                ChunkState::Trailer => {
                    let rest = &input[pos..];
                    let Some(nl) = rest.iter().position(|&b| b == b'\n') else {
                        if rest.len() > MAX_CHUNK_LINE {
                            return Err(WireError::parse("chunk trailer line too long"));
                        }
                        return Ok(pos);
                    };
                    let line = trim_crlf(&rest[..nl]);
                    pos += nl + 1;
                    if line.is_empty() {
                        self.state = ChunkState::Done;
                    }
                }
                ChunkState::Done => return Ok(pos),
            }
        }
    }
}

fn trim_crlf(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

fn parse_chunk_size(line: &[u8]) -> Result<u64, WireError> {
    // extensions follow the size after a semicolon
    let size_part = match line.iter().position(|&b| b == b';') {
        Some(i) => &line[..i],
        None => line,
    };
    let s = std::str::from_utf8(size_part)
        .map_err(|_| WireError::parse("chunk size is not valid UTF-8"))?
        .trim();
    if s.is_empty() {
        return Err(WireError::parse("empty chunk size line"));
    }
    u64::from_str_radix(s, 16).map_err(|_| WireError::parse(format!("invalid chunk size {s:?}")))
}
