//! The Engine: certification and verification over a ledger gateway.
//!
//! Certification binds a document into an envelope, anchors the envelope on
//! a chain and turns the ledger's answer into a [`Certificate`]. Verification
//! locates the anchored record, recomputes the document hash and compares it
//! with the hash stored in the envelope.

use std::sync::Arc;

use anchorcert_core::binding::document_hash;
use anchorcert_core::{
    code, Certificate, CertificateBuilder, ChainId, ChainInfo, Document, Envelope, HashBinder,
    LedgerRecord, Serial,
};
use anchorcert_ledger::{LedgerGateway, LedgerGatewayExt};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::verification::{
    humanize_elapsed, VerificationOutcome, VerificationResult, VerificationTarget,
};

/// The main Engine struct.
///
/// Stateless between calls: it holds the gateway and an immutable
/// configuration, so one engine can serve concurrent requests.
pub struct Engine<L: LedgerGateway> {
    /// The ledger gateway.
    ledger: Arc<L>,
    /// Configuration.
    config: EngineConfig,
    binder: HashBinder,
    certificates: CertificateBuilder,
}

impl<L: LedgerGateway> Clone for Engine<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            config: self.config.clone(),
            binder: self.binder.clone(),
            certificates: self.certificates.clone(),
        }
    }
}

impl<L: LedgerGateway> Engine<L> {
    /// Create a new engine over a gateway.
    pub fn new(ledger: L, config: EngineConfig) -> Self {
        Self::with_shared(Arc::new(ledger), config)
    }

    /// Create an engine over a gateway the caller also keeps a handle to.
    pub fn with_shared(ledger: Arc<L>, config: EngineConfig) -> Self {
        let binder = HashBinder::new(config.source.clone())
            .with_schema_version(config.schema_version.clone());
        let certificates = CertificateBuilder::new()
            .with_title(config.certificate_title.clone())
            .with_verification_url_base(config.verification_url_base.clone());
        Self {
            ledger,
            config,
            binder,
            certificates,
        }
    }

    /// Get the gateway reference.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Certification
    // ─────────────────────────────────────────────────────────────────────────

    /// Anchor a document and issue its certificate.
    ///
    /// Uses the configured default chain when `chain_id` is `None`.
    ///
    /// A failed submission is not retried. Retrying from the caller may
    /// anchor the document twice, on two serials.
    pub async fn certify(
        &self,
        document: &Document,
        chain_id: Option<&ChainId>,
    ) -> Result<Certificate> {
        self.certify_at(document, chain_id, Utc::now()).await
    }

    /// [`Engine::certify`] with an explicit clock reading.
    ///
    /// `now` stamps both the envelope and the certificate, so a fixed `now`
    /// gives a reproducible certificate.
    pub async fn certify_at(
        &self,
        document: &Document,
        chain_id: Option<&ChainId>,
        now: DateTime<Utc>,
    ) -> Result<Certificate> {
        let chain_id = chain_id.unwrap_or(&self.config.default_chain);

        let chain = self
            .ledger
            .find_chain(chain_id)
            .await?
            .ok_or_else(|| EngineError::ChainNotFound(chain_id.clone()))?;

        let binding = self.binder.bind(document, now)?;
        debug!(
            chain = %chain.id,
            document_hash = %binding.document_hash,
            envelope_hash = %binding.envelope_hash,
            "submitting envelope"
        );

        let submission = self.ledger.submit(&chain.id, &binding.envelope_bytes).await?;

        let record = self
            .ledger
            .fetch_record(&chain.id, submission.serial)
            .await?
            .ok_or_else(|| EngineError::RecordMissing {
                chain_id: chain.id.clone(),
                serial: submission.serial,
            })?;

        let certificate = self
            .certificates
            .build(&binding, &submission, &record, &chain, now);

        info!(
            chain = %chain.id,
            serial = submission.serial,
            code = %certificate.verification_code,
            "document certified"
        );
        Ok(certificate)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify a document against any kind of target.
    pub async fn verify(
        &self,
        target: &VerificationTarget,
        document: &Document,
    ) -> Result<VerificationResult> {
        match target {
            VerificationTarget::Code(code) => self.verify_by_code(code, document).await,
            VerificationTarget::Serial {
                serial,
                chain_id,
                expected_hash8,
            } => {
                self.verify_by_serial(
                    *serial,
                    document,
                    chain_id.as_ref(),
                    expected_hash8.as_deref(),
                )
                .await
            }
            VerificationTarget::Certificate(certificate) => {
                self.verify_by_certificate(certificate, document).await
            }
        }
    }

    /// Verify a document against a printed verification code.
    ///
    /// A malformed code yields [`VerificationOutcome::InvalidCode`]. The code
    /// carries no chain, so every listed chain is searched.
    pub async fn verify_by_code(
        &self,
        code: &str,
        document: &Document,
    ) -> Result<VerificationResult> {
        match code::decode(code) {
            Ok(decoded) => {
                self.verify_by_serial(decoded.serial, document, None, Some(&decoded.hash8))
                    .await
            }
            Err(e) => {
                debug!(code, error = %e, "rejecting malformed code");
                Ok(VerificationResult::rejected(
                    VerificationOutcome::InvalidCode,
                    None,
                    None,
                    e.to_string(),
                    Utc::now(),
                ))
            }
        }
    }

    /// Verify a document against a certificate.
    ///
    /// The certificate pins the chain; its code supplies the hash spot-check.
    pub async fn verify_by_certificate(
        &self,
        certificate: &Certificate,
        document: &Document,
    ) -> Result<VerificationResult> {
        match certificate.decoded_code() {
            Ok(decoded) => {
                self.verify_by_serial(
                    decoded.serial,
                    document,
                    Some(&certificate.data.chain_id),
                    Some(&decoded.hash8),
                )
                .await
            }
            Err(e) => Ok(VerificationResult::rejected(
                VerificationOutcome::InvalidCertificate,
                Some(certificate.data.serial),
                Some(certificate.data.chain_id.clone()),
                e.to_string(),
                Utc::now(),
            )),
        }
    }

    /// Verify a document against the record at `serial`.
    ///
    /// Without `chain_id`, chains are searched in listing order and the first
    /// chain holding the serial is used. With `expected_hash8`, the record
    /// hash must start with it (case-insensitive) before the document is
    /// compared at all.
    pub async fn verify_by_serial(
        &self,
        serial: Serial,
        document: &Document,
        chain_id: Option<&ChainId>,
        expected_hash8: Option<&str>,
    ) -> Result<VerificationResult> {
        let verified_at = Utc::now();

        let found = match chain_id {
            Some(id) => self
                .ledger
                .fetch_record(id, serial)
                .await?
                .map(|record| (id.clone(), record)),
            None => self
                .ledger
                .find_record(serial)
                .await?
                .map(|(chain, record)| (chain.id, record)),
        };

        let Some((chain_id, record)) = found else {
            debug!(serial, "record not found");
            return Ok(VerificationResult::rejected(
                VerificationOutcome::RecordNotFound,
                Some(serial),
                chain_id.cloned(),
                VerificationOutcome::RecordNotFound.describe(),
                verified_at,
            ));
        };

        if let Some(hash8) = expected_hash8 {
            if !record.matches_hash8(hash8) {
                debug!(serial, chain = %chain_id, "record hash does not match code");
                return Ok(with_record(
                    VerificationResult::rejected(
                        VerificationOutcome::CodeMismatch,
                        Some(serial),
                        Some(chain_id),
                        VerificationOutcome::CodeMismatch.describe(),
                        verified_at,
                    ),
                    &record,
                ));
            }
        }

        let envelope = match record
            .decode_payload()
            .and_then(|bytes| Envelope::from_payload(&bytes))
        {
            Ok(envelope) => envelope,
            Err(e) => {
                return Ok(with_record(
                    VerificationResult::rejected(
                        VerificationOutcome::PayloadUndecodable,
                        Some(serial),
                        Some(chain_id),
                        e.to_string(),
                        verified_at,
                    ),
                    &record,
                ));
            }
        };

        let provided = document_hash(document)?;
        let anchored = envelope.document_hash;
        let hashes_match = provided == anchored;
        let outcome = if hashes_match {
            VerificationOutcome::Authentic
        } else {
            VerificationOutcome::DocumentMismatch
        };

        info!(serial, chain = %chain_id, ?outcome, "verification complete");

        Ok(VerificationResult {
            valid: hashes_match,
            outcome,
            serial: Some(serial),
            chain_id: Some(chain_id),
            record_hash: Some(record.hash.clone()),
            provided_document_hash: Some(provided),
            anchored_document_hash: Some(anchored),
            hashes_match,
            registered_at: Some(envelope.registered_at),
            verified_at,
            elapsed_since_registration: Some(humanize_elapsed(
                envelope.registered_at,
                verified_at,
            )),
            anchored_envelope: Some(envelope),
            metadata: Some(record.metadata()),
            error: (!hashes_match).then(|| outcome.describe().to_string()),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ledger passthroughs
    // ─────────────────────────────────────────────────────────────────────────

    /// List the ledger's chains.
    pub async fn chains(&self) -> Result<Vec<ChainInfo>> {
        Ok(self.ledger.list_chains().await?)
    }

    /// Read one record.
    pub async fn record(
        &self,
        chain_id: &ChainId,
        serial: Serial,
    ) -> Result<Option<LedgerRecord>> {
        Ok(self.ledger.fetch_record(chain_id, serial).await?)
    }

    /// Read one page of a chain's records, oldest first.
    ///
    /// Uses the configured default chain when `chain_id` is `None`.
    pub async fn records(
        &self,
        chain_id: Option<&ChainId>,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<LedgerRecord>> {
        let chain_id = chain_id.unwrap_or(&self.config.default_chain);
        Ok(self.ledger.list_records(chain_id, page, page_size).await?)
    }
}

fn with_record(mut result: VerificationResult, record: &LedgerRecord) -> VerificationResult {
    result.record_hash = Some(record.hash.clone());
    result.metadata = Some(record.metadata());
    result
}
