//! In-memory ticket cache guarded by a single mutex.
//!
//! Every critical section is one constant-time map lookup or mutation, and nothing awaits or
//! performs I/O while the lock is held.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{SubjectId, TicketId},
	scan::ScanError,
};

/// Lifetime applied to tickets when none is configured; matches the QR code lifetime.
pub const DEFAULT_TICKET_TTL: Duration = Duration::seconds(3600);

const ISSUED_TICKET_LEN: usize = 32;

/// Snapshot of one scan-login attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanTicket {
	/// Ticket handle.
	pub ticket_id: TicketId,
	/// Whether the confirmation callback has fired.
	pub scanned: bool,
	/// Subject confirmed by the callback.
	pub claimed_subject_id: Option<SubjectId>,
	/// When the ticket was registered.
	pub created_at: OffsetDateTime,
}

/// Process-wide store of pending scan-login tickets.
#[derive(Debug)]
pub struct ScanTicketCache {
	tickets: Mutex<HashMap<TicketId, ScanTicket>>,
	ttl: Duration,
}
impl ScanTicketCache {
	/// Creates an empty cache whose tickets expire `ttl` after creation.
	pub fn new(ttl: Duration) -> Self {
		Self { tickets: Mutex::new(HashMap::new()), ttl }
	}

	/// Returns the configured ticket lifetime.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Registers `ticket_id` in the `CREATED` state, replacing any previous entry.
	pub fn create(&self, ticket_id: TicketId) -> ScanTicket {
		self.create_at(ticket_id, OffsetDateTime::now_utc())
	}

	/// [`create`](Self::create) with an explicit clock.
	pub fn create_at(&self, ticket_id: TicketId, now: OffsetDateTime) -> ScanTicket {
		let ticket = ScanTicket {
			ticket_id: ticket_id.clone(),
			scanned: false,
			claimed_subject_id: None,
			created_at: now,
		};

		self.tickets.lock().insert(ticket_id, ticket.clone());

		ticket
	}

	/// Generates a random ticket id and registers it.
	pub fn issue(&self) -> Result<TicketId> {
		let raw = rand::rng()
			.sample_iter(Alphanumeric)
			.take(ISSUED_TICKET_LEN)
			.map(char::from)
			.collect::<String>();
		let ticket_id = TicketId::new(raw).map_err(ScanError::from)?;

		self.create(ticket_id.clone());

		Ok(ticket_id)
	}

	/// Moves a ticket from `CREATED` to `SCANNED`, recording the confirmed subject.
	pub fn mark_scanned(&self, ticket_id: &str, subject: SubjectId) -> Result<()> {
		self.mark_scanned_at(ticket_id, subject, OffsetDateTime::now_utc())
	}

	/// [`mark_scanned`](Self::mark_scanned) with an explicit clock.
	pub fn mark_scanned_at(
		&self,
		ticket_id: &str,
		subject: SubjectId,
		now: OffsetDateTime,
	) -> Result<()> {
		let mut tickets = self.tickets.lock();
		let expired = match tickets.get(ticket_id) {
			Some(ticket) => self.is_expired(ticket, now),
			None => return Err(ScanError::UnknownTicket.into()),
		};

		if expired {
			tickets.remove(ticket_id);

			return Err(ScanError::UnknownTicket.into());
		}

		let Some(ticket) = tickets.get_mut(ticket_id) else {
			return Err(ScanError::UnknownTicket.into());
		};

		if ticket.scanned {
			return Err(ScanError::AlreadyScanned.into());
		}

		ticket.scanned = true;
		ticket.claimed_subject_id = Some(subject);

		Ok(())
	}

	/// Consumes a scanned ticket and returns its subject.
	///
	/// Fails with [`Error::NotScannedOrUnknown`] when the ticket is absent, expired, or still
	/// waiting for its confirmation; a pending ticket stays in place for the next poll.
	pub fn read_and_consume(&self, ticket_id: &str) -> Result<SubjectId> {
		self.read_and_consume_at(ticket_id, OffsetDateTime::now_utc())
	}

	/// [`read_and_consume`](Self::read_and_consume) with an explicit clock.
	pub fn read_and_consume_at(&self, ticket_id: &str, now: OffsetDateTime) -> Result<SubjectId> {
		let mut tickets = self.tickets.lock();
		let state = tickets.get(ticket_id).map(|ticket| (self.is_expired(ticket, now), ticket.scanned));

		match state {
			Some((true, _)) => {
				tickets.remove(ticket_id);

				Err(Error::NotScannedOrUnknown)
			},
			Some((false, true)) => tickets
				.remove(ticket_id)
				.and_then(|ticket| ticket.claimed_subject_id)
				.ok_or(Error::NotScannedOrUnknown),
			_ => Err(Error::NotScannedOrUnknown),
		}
	}

	/// Returns a snapshot of a live ticket without mutating it.
	pub fn peek(&self, ticket_id: &str) -> Option<ScanTicket> {
		let now = OffsetDateTime::now_utc();

		self.tickets.lock().get(ticket_id).filter(|ticket| !self.is_expired(ticket, now)).cloned()
	}

	/// Drops every expired ticket and returns how many were removed.
	pub fn purge_expired(&self) -> usize {
		self.purge_expired_at(OffsetDateTime::now_utc())
	}

	/// [`purge_expired`](Self::purge_expired) with an explicit clock.
	pub fn purge_expired_at(&self, now: OffsetDateTime) -> usize {
		let mut tickets = self.tickets.lock();
		let before = tickets.len();

		tickets.retain(|_, ticket| !self.is_expired(ticket, now));

		before - tickets.len()
	}

	/// Number of entries currently held, expired ones included until purged.
	pub fn len(&self) -> usize {
		self.tickets.lock().len()
	}

	/// Returns `true` when no entries are held.
	pub fn is_empty(&self) -> bool {
		self.tickets.lock().is_empty()
	}

	fn is_expired(&self, ticket: &ScanTicket, now: OffsetDateTime) -> bool {
		now - ticket.created_at >= self.ttl
	}
}
impl Default for ScanTicketCache {
	fn default() -> Self {
		Self::new(DEFAULT_TICKET_TTL)
	}
}
