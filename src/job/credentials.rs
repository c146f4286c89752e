// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! API key selection capability.
//!
//! The job controller receives an optional [`CredentialProvider`]. When none
//! is injected the environment is treated as already authorized. The desktop
//! implementation, [`KeyStore`], keeps the key in memory and asks the UI to
//! show a key prompt when a selection is requested.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Whether a key is currently selected.
    async fn has_selected_key(&self) -> bool;

    /// Ask the user to select a key; resolves once they finish (or dismiss) the prompt.
    async fn open_select_key(&self);

    /// Called when the backend rejected the active key.
    fn reset_selection(&self);
}

#[derive(Debug, Clone, Default)]
struct Selection {
    key: Option<String>,
    prompting: bool,
}

/// In-memory key store driving the key prompt dialog.
#[derive(Debug)]
pub struct KeyStore {
    selection: watch::Sender<Selection>,
}

impl KeyStore {
    pub fn new(initial_key: Option<String>) -> Arc<Self> {
        let key = initial_key.filter(|k| !k.trim().is_empty());
        let (selection, _) = watch::channel(Selection {
            key,
            prompting: false,
        });
        Arc::new(Self { selection })
    }

    pub fn api_key(&self) -> Option<String> {
        self.selection.borrow().key.clone()
    }

    /// Whether the UI should currently show the key prompt.
    pub fn wants_prompt(&self) -> bool {
        self.selection.borrow().prompting
    }

    /// Ask the UI to show the key prompt without waiting for it.
    pub fn request_prompt(&self) {
        self.selection.send_modify(|s| s.prompting = true);
    }

    /// Store a key entered by the user and close the prompt.
    pub fn select_key(&self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        self.selection.send_modify(|s| {
            s.key = Some(key.to_string());
            s.prompting = false;
        });
        log::info!("API key selected");
        true
    }

    /// Close the prompt without selecting a key.
    pub fn dismiss_prompt(&self) {
        self.selection.send_modify(|s| s.prompting = false);
    }
}

#[async_trait]
impl CredentialProvider for KeyStore {
    async fn has_selected_key(&self) -> bool {
        self.selection.borrow().key.is_some()
    }

    async fn open_select_key(&self) {
        let mut rx = self.selection.subscribe();
        self.request_prompt();
        // the sender lives as long as self, so this only returns once the prompt closes
        let _ = rx.wait_for(|s| !s.prompting).await;
    }

    fn reset_selection(&self) {
        log::warn!("API key was rejected by the backend; asking for a new one");
        self.selection.send_modify(|s| {
            s.key = None;
            s.prompting = true;
        });
    }
}
