#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use llm::{
    chat::{ChatMessage, ChatProvider, ChatResponse, Tool},
    error::LLMError,
};
use recicart::catalog::{CandidateProduct, Catalog};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

/// Chat provider answering from a script; `None` entries fail the call.
/// Once the script runs out the last entry is repeated.
pub(crate) struct StubLlmProvider {
    responses: Mutex<VecDeque<Option<String>>>,
    last: Mutex<Option<String>>,
    prompts: Mutex<Vec<String>>,
    hangs: bool,
}

impl StubLlmProvider {
    pub fn new(response_content: &str) -> Self {
        Self::scripted(vec![Some(response_content)])
    }

    pub fn failing() -> Self {
        Self::scripted(vec![None])
    }

    /// A provider whose answer never arrives.
    pub fn hanging() -> Self {
        StubLlmProvider {
            hangs: true,
            ..Self::new("1")
        }
    }

    pub fn scripted(responses: Vec<Option<&str>>) -> Self {
        StubLlmProvider {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|response| response.map(str::to_owned))
                    .collect(),
            ),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
            hangs: false,
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts mutex poisoned").clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }

    fn next_response(&self) -> Option<String> {
        let mut responses = self.responses.lock().expect("responses mutex poisoned");
        let mut last = self.last.lock().expect("last mutex poisoned");
        if let Some(response) = responses.pop_front() {
            *last = response;
        }
        last.clone()
    }
}

impl ChatProvider for StubLlmProvider {
    fn chat<'life0, 'life1, 'async_trait>(
        &'life0 self,
        messages: &'life1 [ChatMessage],
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        self.prompts
            .lock()
            .expect("prompts mutex poisoned")
            .extend(messages.iter().map(|message| message.content.clone()));
        let response = self.next_response();
        let hangs = self.hangs;

        Box::pin(async move {
            if hangs {
                std::future::pending::<()>().await;
            }

            #[derive(Debug)]
            struct StringResponse(String);

            impl ChatResponse for StringResponse {
                fn text(&self) -> Option<String> {
                    Some(self.0.clone())
                }

                fn tool_calls(&self) -> Option<Vec<llm::ToolCall>> {
                    panic!()
                }

                fn thinking(&self) -> Option<String> {
                    None
                }

                fn usage(&self) -> Option<llm::chat::Usage> {
                    None
                }
            }

            impl std::fmt::Display for StringResponse {
                fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(formatter, "{}", self.0)
                }
            }

            match response {
                Some(content) => Ok(Box::new(StringResponse(content)) as Box<dyn ChatResponse>),
                None => Err(LLMError::ProviderError("stub provider is down".to_owned())),
            }
        })
    }

    fn chat_with_tools<'life0, 'life1, 'life2, 'async_trait>(
        &'life0 self,
        _messages: &'life1 [ChatMessage],
        _tools: Option<&'life2 [Tool]>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        Self: 'async_trait,
    {
        panic!()
    }
}

pub(crate) fn candidate(title: &str, display_volume: Option<&str>) -> CandidateProduct {
    CandidateProduct {
        title: title.to_owned(),
        display_volume: display_volume.map(str::to_owned),
        ..CandidateProduct::default()
    }
}

pub(crate) fn candidates_with_volumes(volumes: &[&str]) -> Vec<CandidateProduct> {
    volumes
        .iter()
        .enumerate()
        .map(|(handle, volume)| CandidateProduct {
            handle,
            title: format!("Product {volume}"),
            display_volume: Some((*volume).to_owned()),
            ..CandidateProduct::default()
        })
        .collect()
}

/// Catalog that returns the same candidates for every search and records
/// the cart actions it was asked for.
pub(crate) struct MemoryCatalog {
    pub candidates: Vec<CandidateProduct>,
    pub searches: Vec<String>,
    pub actions: Vec<(String, usize)>,
    pub fail_search: bool,
    pub fail_increase: bool,
}

impl MemoryCatalog {
    pub fn new(candidates: Vec<CandidateProduct>) -> Self {
        MemoryCatalog {
            candidates,
            searches: Vec::new(),
            actions: Vec::new(),
            fail_search: false,
            fail_increase: false,
        }
    }
}

impl Catalog for MemoryCatalog {
    async fn search(&mut self, term: &str) -> Result<Vec<CandidateProduct>> {
        self.searches.push(term.to_owned());
        if self.fail_search {
            anyhow::bail!("store is down");
        }
        Ok(self.candidates.clone())
    }

    async fn select(&mut self, product: &CandidateProduct) -> Result<()> {
        self.actions.push(("select".to_owned(), product.handle));
        Ok(())
    }

    async fn increase_quantity(&mut self, product: &CandidateProduct) -> Result<()> {
        self.actions.push(("increase".to_owned(), product.handle));
        if self.fail_increase {
            anyhow::bail!("button not found");
        }
        Ok(())
    }
}

/// Serves `html` to every request on a local port.
pub(crate) async fn serve_page(html: &'static str) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let address = listener.local_addr().expect("Expected a local address.");

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut request = [0_u8; 4096];
            let _ = stream.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{html}",
                html.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    Url::parse(&format!("http://{address}/recipe")).expect("Expected a valid URL.")
}

/// Accepts connections on a local port and never answers.
pub(crate) async fn serve_silence() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let address = listener.local_addr().expect("Expected a local address.");

    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            open.push(stream);
        }
    });

    Url::parse(&format!("http://{address}/recipe")).expect("Expected a valid URL.")
}

/// A local URL nothing listens on.
pub(crate) async fn unreachable_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let address = listener.local_addr().expect("Expected a local address.");
    drop(listener);

    Url::parse(&format!("http://{address}/recipe")).expect("Expected a valid URL.")
}
