//! IMAP client backing [`MailboxSession`] with a real server connection.

use async_imap::Session;
use async_native_tls::TlsConnector;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::config::schema::{MailboxAuthSettings, MailboxConfig};
use crate::sanitize::redact_address;

use super::error::{MailboxError, Result};
use super::session::{MailboxSession, SeqNum, Uid};

/// Type alias for the underlying async stream (using async-std compatible TcpStream).
type AsyncTcpStream = async_io::Async<std::net::TcpStream>;

/// Type alias for the TLS stream used by the IMAP session.
type TlsStream = async_native_tls::TlsStream<AsyncTcpStream>;

/// IMAP client holding one authenticated session.
pub struct ImapClient {
    session: Option<Session<TlsStream>>,
    config: MailboxConfig,
    current_folder: Option<String>,
}

impl ImapClient {
    /// Creates a new IMAP client with the given configuration.
    pub fn new(config: MailboxConfig) -> Self {
        Self {
            session: None,
            config,
            current_folder: None,
        }
    }

    /// Connects to the IMAP server and logs in.
    ///
    /// A rejected login is reported as [`MailboxError::AuthenticationFailed`];
    /// callers must not retry it.
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            debug!("Already connected to IMAP server");
            return Ok(());
        }

        if !self.config.use_tls {
            return Err(MailboxError::ConfigError(
                "TLS is required for secure email connections".to_string(),
            ));
        }

        let password = resolve_password(&self.config.auth)?;

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Connecting to IMAP server at {}", addr);

        // Establish TCP connection using std::net and wrap with async-io
        let std_stream = std::net::TcpStream::connect(&addr)
            .map_err(|e| MailboxError::ConnectionFailed(e.to_string()))?;
        std_stream
            .set_nonblocking(true)
            .map_err(|e| MailboxError::ConnectionFailed(e.to_string()))?;
        let tcp_stream = async_io::Async::new(std_stream)
            .map_err(|e| MailboxError::ConnectionFailed(e.to_string()))?;

        let tls = TlsConnector::new();
        let tls_stream = tls.connect(&self.config.host, tcp_stream).await?;

        let client = async_imap::Client::new(tls_stream);
        let session = client
            .login(&self.config.username, password.expose_secret())
            .await
            .map_err(|(e, _)| MailboxError::AuthenticationFailed(e.to_string()))?;

        info!(
            "Authenticated to IMAP server as {}",
            redact_address(&self.config.username)
        );
        self.session = Some(session);
        Ok(())
    }

    /// Checks if the client is currently connected.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Name of the folder chosen by the last successful select.
    pub fn current_folder(&self) -> Option<&str> {
        self.current_folder.as_deref()
    }

    fn session_mut(&mut self) -> Result<&mut Session<TlsStream>> {
        self.session
            .as_mut()
            .ok_or_else(|| MailboxError::ConnectionFailed("Not connected".to_string()))
    }
}

#[async_trait]
impl MailboxSession for ImapClient {
    async fn list_folders(&mut self) -> Result<Vec<String>> {
        let session = self.session_mut()?;
        let names: Vec<_> = session
            .list(Some(""), Some("*"))
            .await
            .map_err(|e| MailboxError::ProtocolError(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| MailboxError::ProtocolError(e.to_string()))?;

        let folders: Vec<String> = names.iter().map(|n| n.name().to_string()).collect();
        debug!("Server lists {} folders", folders.len());
        Ok(folders)
    }

    async fn select(&mut self, folder: &str) -> Result<u32> {
        let session = self.session_mut()?;
        debug!("Selecting folder: {}", folder);

        let mailbox = session.select(folder).await.map_err(|e| {
            let message = e.to_string();
            if message.contains("doesn't exist") || message.contains("NONEXISTENT") {
                MailboxError::FolderNotFound(folder.to_string())
            } else {
                MailboxError::command("SELECT", message)
            }
        })?;

        self.current_folder = Some(folder.to_string());
        Ok(mailbox.exists)
    }

    async fn search_unseen(&mut self) -> Result<Vec<SeqNum>> {
        let session = self.session_mut()?;
        let found = session
            .search("UNSEEN")
            .await
            .map_err(|e| MailboxError::command("SEARCH", e))?;

        let mut seqs: Vec<SeqNum> = found.into_iter().collect();
        seqs.sort_unstable();
        debug!("Found {} unseen messages", seqs.len());
        Ok(seqs)
    }

    async fn fetch_uid(&mut self, seq: SeqNum) -> Result<Uid> {
        let session = self.session_mut()?;
        let fetches: Vec<_> = session
            .fetch(seq.to_string(), "UID")
            .await
            .map_err(|e| MailboxError::command("FETCH", e))?
            .try_collect()
            .await
            .map_err(|e| MailboxError::ProtocolError(e.to_string()))?;

        fetches
            .iter()
            .find_map(|fetch| fetch.uid)
            .ok_or(MailboxError::MessageNotFound(seq))
    }

    async fn fetch_raw(&mut self, seq: SeqNum) -> Result<Vec<u8>> {
        let session = self.session_mut()?;
        let fetches: Vec<_> = session
            .fetch(seq.to_string(), "RFC822")
            .await
            .map_err(|e| MailboxError::command("FETCH", e))?
            .try_collect()
            .await
            .map_err(|e| MailboxError::ProtocolError(e.to_string()))?;

        fetches
            .iter()
            .find_map(|fetch| fetch.body().map(<[u8]>::to_vec))
            .ok_or(MailboxError::MessageNotFound(seq))
    }

    async fn copy(&mut self, uid: Uid, destination: &str) -> Result<()> {
        debug!(
            "Copying UID {} from {} to {}",
            uid,
            self.current_folder().unwrap_or("<none>"),
            destination
        );
        let session = self.session_mut()?;
        session
            .uid_copy(uid.to_string(), destination)
            .await
            .map_err(|e| MailboxError::command("COPY", e))
    }

    async fn flag_deleted(&mut self, uid: Uid) -> Result<()> {
        debug!(
            "Flagging UID {} deleted in {}",
            uid,
            self.current_folder().unwrap_or("<none>")
        );
        let session = self.session_mut()?;
        let _updates: Vec<_> = session
            .uid_store(uid.to_string(), "+FLAGS (\\Deleted)")
            .await
            .map_err(|e| MailboxError::command("STORE", e))?
            .try_collect()
            .await
            .map_err(|e| MailboxError::command("STORE", e))?;
        Ok(())
    }

    async fn expunge(&mut self) -> Result<()> {
        let session = self.session_mut()?;
        let removed: Vec<_> = session
            .expunge()
            .await
            .map_err(|e| MailboxError::command("EXPUNGE", e))?
            .try_collect()
            .await
            .map_err(|e| MailboxError::command("EXPUNGE", e))?;
        debug!("Expunged {} messages", removed.len());
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            info!("Disconnecting from IMAP server");
            session
                .logout()
                .await
                .map_err(|e| MailboxError::ProtocolError(e.to_string()))?;
        }
        self.current_folder = None;
        Ok(())
    }
}

impl Drop for ImapClient {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("ImapClient dropped without explicit logout - session will be closed");
        }
    }
}

/// Resolves the account password from the configured sources.
fn resolve_password(auth: &MailboxAuthSettings) -> Result<SecretString> {
    if auth.password_insecure.is_some() {
        warn!(
            "Using direct password value (passwordInsecure) is not recommended. \
             Consider using passwordEnvVar or passwordFile instead."
        );
    }
    crate::secrets::resolve_secret(
        auth.password_insecure.as_deref(),
        auth.password_file.as_deref(),
        auth.password_env_var.as_deref(),
    )
    .map_err(|e| MailboxError::CredentialsNotFound(e.to_string()))
}
