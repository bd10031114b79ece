//! In-memory transport that records requests and replays a canned body.

use std::sync::Mutex;

use crate::{
    error::Result,
    transport::{RequestContext, Transport, TransportResponse, sealed},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug)]
pub(crate) struct RecordingTransport {
    body: Vec<u8>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub fn responding(body: &str) -> Self {
        Self { body: body.as_bytes().to_vec(), requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(
        &self,
        method: &'static str,
        ctx: RequestContext<'_>,
        params: &[(String, String)],
    ) -> TransportResponse {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: ctx.url(),
            params: params.to_vec(),
        });
        TransportResponse { status: 200, body: self.body.clone() }
    }
}

impl sealed::private::Sealed for RecordingTransport {}

impl Transport for RecordingTransport {
    async fn get<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        query: &'a [(String, String)],
    ) -> Result<TransportResponse> {
        Ok(self.record("GET", ctx, query))
    }

    async fn post_form<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        form: &'a [(String, String)],
    ) -> Result<TransportResponse> {
        Ok(self.record("POST", ctx, form))
    }

    fn protocol_name(&self) -> &'static str {
        "recording"
    }
}
