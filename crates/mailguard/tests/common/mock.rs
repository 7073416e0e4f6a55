//! In-memory mailbox session.
//!
//! Clones share state, so a test keeps one handle for inspection while the
//! controller owns the other.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use mailguard::mailbox::error::Result;
use mailguard::mailbox::{MailboxError, MailboxSession, SeqNum, Uid};

/// A command received by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListFolders,
    Select(String),
    SearchUnseen,
    FetchUid(SeqNum),
    FetchRaw(SeqNum),
    Copy(Uid, String),
    FlagDeleted(Uid),
    Expunge,
    Logout,
}

#[derive(Debug, Clone)]
struct StoredMessage {
    seq: SeqNum,
    uid: Uid,
    raw: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    tree: Vec<String>,
    folders: HashMap<String, Vec<StoredMessage>>,
    selected: Option<String>,
    calls: Vec<Call>,

    fail_list: bool,
    fail_select: HashSet<String>,
    fail_search: HashSet<String>,
    fail_fetch_uid: HashSet<SeqNum>,
    fail_fetch_raw: HashSet<SeqNum>,
    fail_copy: HashSet<Uid>,
    fail_flag: HashSet<Uid>,
    fail_expunge: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockSession {
    state: Arc<Mutex<State>>,
}

impl MockSession {
    /// A mailbox whose tree holds `tree`, all folders empty.
    pub fn with_tree(tree: &[&str]) -> Self {
        let session = Self::default();
        {
            let mut state = session.state();
            state.tree = tree.iter().map(|s| s.to_string()).collect();
            for name in tree {
                state.folders.insert(name.to_string(), Vec::new());
            }
        }
        session
    }

    /// Adds an unseen message to `folder`. Sequence numbers are assigned in
    /// insertion order starting at 1.
    pub fn add_message(self, folder: &str, uid: Uid, raw: Vec<u8>) -> Self {
        {
            let mut state = self.state();
            if !state.tree.iter().any(|f| f == folder) {
                state.tree.push(folder.to_string());
            }
            let messages = state.folders.entry(folder.to_string()).or_default();
            let seq = messages.len() as SeqNum + 1;
            messages.push(StoredMessage { seq, uid, raw });
        }
        self
    }

    pub fn fail_list(self) -> Self {
        self.state().fail_list = true;
        self
    }

    pub fn fail_select(self, folder: &str) -> Self {
        self.state().fail_select.insert(folder.to_string());
        self
    }

    pub fn fail_search(self, folder: &str) -> Self {
        self.state().fail_search.insert(folder.to_string());
        self
    }

    pub fn fail_fetch_uid(self, seq: SeqNum) -> Self {
        self.state().fail_fetch_uid.insert(seq);
        self
    }

    pub fn fail_fetch_raw(self, seq: SeqNum) -> Self {
        self.state().fail_fetch_raw.insert(seq);
        self
    }

    pub fn fail_copy(self, uid: Uid) -> Self {
        self.state().fail_copy.insert(uid);
        self
    }

    pub fn fail_flag(self, uid: Uid) -> Self {
        self.state().fail_flag.insert(uid);
        self
    }

    pub fn fail_expunge(self) -> Self {
        self.state().fail_expunge = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.state().calls.iter().filter(|c| *c == call).count()
    }

    pub fn count_matching(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn logged_out(&self) -> bool {
        self.state().calls.last() == Some(&Call::Logout)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: Call) -> MutexGuard<'_, State> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }
}

fn selected_message(state: &State, seq: SeqNum) -> Result<StoredMessage> {
    state
        .selected
        .as_ref()
        .and_then(|folder| state.folders.get(folder))
        .and_then(|messages| messages.iter().find(|m| m.seq == seq))
        .cloned()
        .ok_or(MailboxError::MessageNotFound(seq))
}

#[async_trait]
impl MailboxSession for MockSession {
    async fn list_folders(&mut self) -> Result<Vec<String>> {
        let state = self.record(Call::ListFolders);
        if state.fail_list {
            return Err(MailboxError::ProtocolError("LIST rejected".to_string()));
        }
        Ok(state.tree.clone())
    }

    async fn select(&mut self, folder: &str) -> Result<u32> {
        let mut state = self.record(Call::Select(folder.to_string()));
        if state.fail_select.contains(folder) {
            return Err(MailboxError::command("SELECT", "NO mailbox unavailable"));
        }
        let exists = match state.folders.get(folder) {
            Some(messages) => messages.len() as u32,
            None => return Err(MailboxError::FolderNotFound(folder.to_string())),
        };
        state.selected = Some(folder.to_string());
        Ok(exists)
    }

    async fn search_unseen(&mut self) -> Result<Vec<SeqNum>> {
        let state = self.record(Call::SearchUnseen);
        let folder = state.selected.clone().unwrap_or_default();
        if state.fail_search.contains(&folder) {
            return Err(MailboxError::command("SEARCH", "BAD search failed"));
        }
        Ok(state
            .folders
            .get(&folder)
            .map(|messages| messages.iter().map(|m| m.seq).collect())
            .unwrap_or_default())
    }

    async fn fetch_uid(&mut self, seq: SeqNum) -> Result<Uid> {
        let state = self.record(Call::FetchUid(seq));
        if state.fail_fetch_uid.contains(&seq) {
            return Err(MailboxError::command("FETCH", "NO uid unavailable"));
        }
        selected_message(&state, seq).map(|m| m.uid)
    }

    async fn fetch_raw(&mut self, seq: SeqNum) -> Result<Vec<u8>> {
        let state = self.record(Call::FetchRaw(seq));
        if state.fail_fetch_raw.contains(&seq) {
            return Err(MailboxError::command("FETCH", "NO body unavailable"));
        }
        selected_message(&state, seq).map(|m| m.raw)
    }

    async fn copy(&mut self, uid: Uid, destination: &str) -> Result<()> {
        let state = self.record(Call::Copy(uid, destination.to_string()));
        if state.fail_copy.contains(&uid) {
            return Err(MailboxError::command("COPY", "NO [OVERQUOTA] quota exceeded"));
        }
        Ok(())
    }

    async fn flag_deleted(&mut self, uid: Uid) -> Result<()> {
        let state = self.record(Call::FlagDeleted(uid));
        if state.fail_flag.contains(&uid) {
            return Err(MailboxError::command("STORE", "NO read-only"));
        }
        Ok(())
    }

    async fn expunge(&mut self) -> Result<()> {
        let state = self.record(Call::Expunge);
        if state.fail_expunge {
            return Err(MailboxError::command("EXPUNGE", "NO expunge failed"));
        }
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        let mut state = self.record(Call::Logout);
        state.selected = None;
        Ok(())
    }
}
