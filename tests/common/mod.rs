//! Shared test support: a byte-accurate ZIP builder and a pair of in-process
//! HTTP test servers, one that honors Range requests and one that doesn't
//! (§8 end-to-end scenarios).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes as AxumBytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::Write as _;
use tokio::net::TcpListener;

/// Builds a minimal, spec-conformant ZIP archive byte-for-byte, the same way
/// [`remotezip`]'s own parser reads one back. Supports STORED and DEFLATE
/// members and directory markers, which is everything the end-to-end
/// scenarios in §8 need.
pub struct ZipBuilder {
    body: Vec<u8>,
    central: Vec<u8>,
    count: u16,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            central: Vec::new(),
            count: 0,
        }
    }

    pub fn add_stored(&mut self, name: &str, data: &[u8]) -> &mut Self {
        self.add(name, data, data, 0, false)
    }

    pub fn add_deflate(&mut self, name: &str, data: &[u8]) -> &mut Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();
        self.add(name, &compressed, data, 8, false)
    }

    pub fn add_directory(&mut self, name: &str) -> &mut Self {
        assert!(name.ends_with('/'), "directory entries must end with '/'");
        self.add(name, &[], &[], 0, true)
    }

    fn add(
        &mut self,
        name: &str,
        payload: &[u8],
        original: &[u8],
        method: u16,
        is_directory: bool,
    ) -> &mut Self {
        let local_header_offset = self.body.len() as u32;
        let mut crc = flate2::Crc::new();
        crc.update(original);
        let crc32 = crc.sum();

        // Local File Header
        self.body.extend_from_slice(&[0x50, 0x4B, 0x03, 0x04]);
        self.body.extend_from_slice(&20u16.to_le_bytes());
        self.body.extend_from_slice(&0u16.to_le_bytes());
        self.body.extend_from_slice(&method.to_le_bytes());
        self.body.extend_from_slice(&0u16.to_le_bytes());
        self.body.extend_from_slice(&0u16.to_le_bytes());
        self.body.extend_from_slice(&crc32.to_le_bytes());
        self.body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.body.extend_from_slice(&(original.len() as u32).to_le_bytes());
        self.body.extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.body.extend_from_slice(&0u16.to_le_bytes());
        self.body.extend_from_slice(name.as_bytes());
        self.body.extend_from_slice(payload);

        // Central Directory File Header
        self.central.extend_from_slice(&[0x50, 0x4B, 0x01, 0x02]);
        self.central.extend_from_slice(&20u16.to_le_bytes()); // version_made_by
        self.central.extend_from_slice(&20u16.to_le_bytes()); // version_needed
        self.central.extend_from_slice(&0u16.to_le_bytes()); // flags
        self.central.extend_from_slice(&method.to_le_bytes());
        self.central.extend_from_slice(&0u16.to_le_bytes()); // mod_time
        self.central.extend_from_slice(&0u16.to_le_bytes()); // mod_date
        self.central.extend_from_slice(&crc32.to_le_bytes());
        self.central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.central.extend_from_slice(&(original.len() as u32).to_le_bytes());
        self.central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.central.extend_from_slice(&0u16.to_le_bytes()); // extra_field_length
        self.central.extend_from_slice(&0u16.to_le_bytes()); // file_comment_length
        self.central.extend_from_slice(&0u16.to_le_bytes()); // disk_number_start
        self.central.extend_from_slice(&0u16.to_le_bytes()); // internal_attrs
        let external_attrs: u32 = if is_directory { 0x10 } else { 0 };
        self.central.extend_from_slice(&external_attrs.to_le_bytes());
        self.central.extend_from_slice(&local_header_offset.to_le_bytes());
        self.central.extend_from_slice(name.as_bytes());

        self.count += 1;
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let cd_offset = self.body.len() as u32;
        let cd_size = self.central.len() as u32;

        let mut out = self.body;
        out.extend_from_slice(&self.central);

        out.extend_from_slice(&[0x50, 0x4B, 0x05, 0x06]);
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // comment length

        out
    }
}

/// Spawns an in-process server that serves `bytes` at `/archive.zip`,
/// honoring `Range` requests with `206 Partial Content` — the normal case.
pub async fn spawn_range_server(bytes: Vec<u8>) -> String {
    let state = Arc::new(bytes);
    let app = Router::new()
        .route("/archive.zip", get(serve_range).head(serve_head))
        .with_state(state);
    spawn(app).await
}

/// Spawns an in-process server that always returns `200 OK` with the full
/// body, ignoring any `Range` header — exercises the
/// `RangeUnsupported` failure path (§8 scenario 6).
pub async fn spawn_no_range_server(bytes: Vec<u8>) -> String {
    let state = Arc::new(bytes);
    let app = Router::new()
        .route("/archive.zip", get(serve_full).head(serve_head))
        .with_state(state);
    spawn(app).await
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}/archive.zip")
}

async fn serve_head(State(data): State<Arc<Vec<u8>>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert("content-length", data.len().to_string().parse().unwrap());
    headers.insert("accept-ranges", "bytes".parse().unwrap());
    (StatusCode::OK, headers)
}

async fn serve_full(State(data): State<Arc<Vec<u8>>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert("content-length", data.len().to_string().parse().unwrap());
    (StatusCode::OK, headers, AxumBytes::copy_from_slice(&data))
}

async fn serve_range(headers: HeaderMap, State(data): State<Arc<Vec<u8>>>) -> impl IntoResponse {
    let range = headers
        .get("range")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range_header);

    match range {
        Some((start, end)) if start <= end && (end as usize) < data.len() => {
            let slice = &data[start as usize..=end as usize];
            let mut resp_headers = HeaderMap::new();
            resp_headers.insert("content-length", slice.len().to_string().parse().unwrap());
            resp_headers.insert(
                "content-range",
                format!("bytes {start}-{end}/{}", data.len()).parse().unwrap(),
            );
            (
                StatusCode::PARTIAL_CONTENT,
                resp_headers,
                AxumBytes::copy_from_slice(slice),
            )
        }
        _ => {
            let mut resp_headers = HeaderMap::new();
            resp_headers.insert("content-length", data.len().to_string().parse().unwrap());
            (StatusCode::OK, resp_headers, AxumBytes::copy_from_slice(&data))
        }
    }
}

fn parse_range_header(value: &str) -> Option<(u64, u64)> {
    let spec = value.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}
