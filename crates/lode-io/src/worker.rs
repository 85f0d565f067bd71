use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use hashbrown::{HashMap, HashSet};

use crate::IoError;

/// Uncollected responses a worker holds before dropping the oldest.
pub const MAX_PARKED: usize = 64;

static NEXT_WORKER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressionOp {
    Deflate,
    /// Output is cut off after `limit` bytes.
    Inflate { limit: usize },
}

#[derive(Clone, Debug)]
pub struct CompressionRequest {
    pub id: u64,
    pub op: CompressionOp,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct CompressionResponse {
    pub id: u64,
    pub result: Result<Vec<u8>, String>,
}

/// Byte transform run on the worker threads.
pub trait Codec: Send + Sync + 'static {
    fn deflate(&self, data: &[u8]) -> std::io::Result<Vec<u8>>;
    /// Decodes at most `limit` bytes of output.
    fn inflate(&self, data: &[u8], limit: usize) -> std::io::Result<Vec<u8>>;
}

/// zlib stream via flate2.
#[derive(Clone, Copy, Debug)]
pub struct Zlib {
    pub level: u32,
}

impl Default for Zlib {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl Codec for Zlib {
    fn deflate(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut enc = ZlibEncoder::new(Vec::with_capacity(data.len() / 4), Compression::new(self.level.min(9)));
        enc.write_all(data)?;
        enc.finish()
    }

    fn inflate(&self, data: &[u8], limit: usize) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len().saturating_mul(4).min(limit));
        ZlibDecoder::new(data).take(limit as u64).read_to_end(&mut out)?;
        Ok(out)
    }
}

/// Claim on one submitted request, valid only on the worker that issued it.
/// Collecting the result consumes it.
///
/// ```compile_fail
/// use lode_io::{CompressionOp, CompressionWorker};
/// let mut w = CompressionWorker::new(1);
/// let t = w.submit(CompressionOp::Deflate, vec![1, 2, 3]).unwrap();
/// let _ = w.wait(t);
/// let _ = w.wait(t);
/// ```
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct Ticket {
    worker: u64,
    id: u64,
}

impl Ticket {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Request/response compression service on background threads. Ids grow
/// monotonically; responses may arrive in any order and are parked until
/// their ticket is collected. At most [`MAX_PARKED`] responses are parked;
/// past that the oldest is dropped and its ticket becomes unknown.
pub struct CompressionWorker {
    tag: u64,
    job_tx: Option<Sender<CompressionRequest>>,
    res_rx: Receiver<CompressionResponse>,
    outstanding: HashSet<u64>,
    parked: HashMap<u64, Result<Vec<u8>, String>>,
    next_id: u64,
    threads: Vec<JoinHandle<()>>,
}

impl CompressionWorker {
    pub fn new(threads: usize) -> Self {
        Self::with_codec(Zlib::default(), threads)
    }

    pub fn with_codec<C: Codec>(codec: C, threads: usize) -> Self {
        let (job_tx, job_rx) = unbounded::<CompressionRequest>();
        let (res_tx, res_rx) = unbounded::<CompressionResponse>();
        let codec = Arc::new(codec);
        let threads = (0..threads.max(1))
            .map(|n| {
                let rx = job_rx.clone();
                let tx = res_tx.clone();
                let codec = codec.clone();
                thread::Builder::new()
                    .name(format!("lode-compress-{n}"))
                    .spawn(move || {
                        while let Ok(req) = rx.recv() {
                            let result = match req.op {
                                CompressionOp::Deflate => codec.deflate(&req.data),
                                CompressionOp::Inflate { limit } => codec.inflate(&req.data, limit),
                            };
                            let result = result.map_err(|e| e.to_string());
                            if tx.send(CompressionResponse { id: req.id, result }).is_err() {
                                break;
                            }
                        }
                    })
            })
            .filter_map(|h| match h {
                Ok(h) => Some(h),
                Err(e) => {
                    log::warn!("compression thread failed to start: {e}");
                    None
                }
            })
            .collect();
        Self {
            tag: NEXT_WORKER.fetch_add(1, Ordering::Relaxed),
            job_tx: Some(job_tx),
            res_rx,
            outstanding: HashSet::new(),
            parked: HashMap::new(),
            next_id: 1,
            threads,
        }
    }

    /// Queues `data` and returns immediately.
    pub fn submit(&mut self, op: CompressionOp, data: Vec<u8>) -> Result<Ticket, IoError> {
        let tx = self.job_tx.as_ref().filter(|_| !self.threads.is_empty()).ok_or(IoError::WorkerGone)?;
        let id = self.next_id;
        self.next_id += 1;
        tx.send(CompressionRequest { id, op, data }).map_err(|_| IoError::WorkerGone)?;
        self.outstanding.insert(id);
        Ok(Ticket { worker: self.tag, id })
    }

    fn is_outstanding(&self, ticket: &Ticket) -> bool {
        ticket.worker == self.tag && self.outstanding.contains(&ticket.id)
    }

    fn collect(&mut self, id: u64, result: Result<Vec<u8>, String>) -> Result<Vec<u8>, IoError> {
        self.outstanding.remove(&id);
        result.map_err(IoError::Compression)
    }

    fn park(&mut self, resp: CompressionResponse) {
        if !self.outstanding.contains(&resp.id) {
            return;
        }
        self.parked.insert(resp.id, resp.result);
        if self.parked.len() > MAX_PARKED {
            if let Some(oldest) = self.parked.keys().copied().min() {
                self.parked.remove(&oldest);
                self.outstanding.remove(&oldest);
                log::warn!("dropping uncollected compression response id={oldest}");
            }
        }
    }

    /// Blocks until the response for `ticket` arrives, parking any others.
    /// A ticket from another worker, or one whose response was dropped, is
    /// rejected without blocking.
    pub fn wait(&mut self, ticket: Ticket) -> Result<Vec<u8>, IoError> {
        if !self.is_outstanding(&ticket) {
            return Err(IoError::UnknownTicket(ticket.id));
        }
        if let Some(r) = self.parked.remove(&ticket.id) {
            return self.collect(ticket.id, r);
        }
        loop {
            let resp = self.res_rx.recv().map_err(|_| IoError::WorkerGone)?;
            if resp.id == ticket.id {
                return self.collect(resp.id, resp.result);
            }
            self.park(resp);
        }
    }

    /// Non-blocking collect; hands the ticket back while the request is in flight.
    pub fn try_take(&mut self, ticket: Ticket) -> Result<Result<Vec<u8>, IoError>, Ticket> {
        if !self.is_outstanding(&ticket) {
            return Ok(Err(IoError::UnknownTicket(ticket.id)));
        }
        while let Ok(resp) = self.res_rx.try_recv() {
            self.park(resp);
        }
        match self.parked.remove(&ticket.id) {
            Some(r) => Ok(self.collect(ticket.id, r)),
            None if !self.outstanding.contains(&ticket.id) => Ok(Err(IoError::UnknownTicket(ticket.id))),
            None => Err(ticket),
        }
    }

    pub fn request(&mut self, op: CompressionOp, data: Vec<u8>) -> Result<Vec<u8>, IoError> {
        let t = self.submit(op, data)?;
        self.wait(t)
    }
}

impl Drop for CompressionWorker {
    fn drop(&mut self) {
        // Closing the job channel ends every worker loop.
        self.job_tx.take();
        for h in self.threads.drain(..) {
            let _ = h.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deflate_then_inflate() {
        let mut w = CompressionWorker::new(1);
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 7) as u8).collect();
        let packed = w.request(CompressionOp::Deflate, data.clone()).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(w.request(CompressionOp::Inflate { limit: usize::MAX }, packed).unwrap(), data);
    }

    #[test]
    fn inflate_stops_at_the_limit() {
        let mut w = CompressionWorker::new(1);
        let packed = w.request(CompressionOp::Deflate, vec![0; 1 << 20]).unwrap();
        let out = w.request(CompressionOp::Inflate { limit: 100 }, packed).unwrap();
        assert_eq!(out.len(), 100);
    }

    #[test]
    fn responses_match_their_tickets_in_any_wait_order() {
        let mut w = CompressionWorker::new(3);
        let inputs: Vec<Vec<u8>> = (0..8u8).map(|k| vec![k; 1000 + k as usize * 100]).collect();
        let tickets: Vec<Ticket> =
            inputs.iter().map(|d| w.submit(CompressionOp::Deflate, d.clone()).unwrap()).collect();
        assert!(tickets.windows(2).all(|p| p[0].id() < p[1].id()));
        for (t, d) in tickets.into_iter().zip(inputs.iter()).rev() {
            let packed = w.wait(t).unwrap();
            assert_eq!(&Zlib::default().inflate(&packed, usize::MAX).unwrap(), d);
        }
        assert!(w.outstanding.is_empty());
        assert!(w.parked.is_empty());
    }

    #[test]
    fn foreign_ticket_is_rejected_without_blocking() {
        let mut a = CompressionWorker::new(1);
        let mut b = CompressionWorker::new(1);
        let ta = a.submit(CompressionOp::Deflate, vec![1; 64]).unwrap();
        let tb = b.submit(CompressionOp::Deflate, vec![2; 64]).unwrap();
        // Same id on both workers; only the issuer accepts it.
        assert_eq!(ta.id(), tb.id());
        assert_eq!(b.wait(ta), Err(IoError::UnknownTicket(1)));
        assert!(b.wait(tb).is_ok());
    }

    #[test]
    fn try_take_hands_back_until_ready() {
        let mut w = CompressionWorker::new(1);
        let mut t = w.submit(CompressionOp::Deflate, vec![7; 1 << 16]).unwrap();
        let packed = loop {
            match w.try_take(t) {
                Ok(r) => break r.unwrap(),
                Err(back) => {
                    t = back;
                    thread::yield_now();
                }
            }
        };
        assert_eq!(Zlib::default().inflate(&packed, usize::MAX).unwrap(), vec![7; 1 << 16]);
        assert!(w.outstanding.is_empty());
    }

    #[test]
    fn uncollected_responses_are_bounded() {
        let mut w = CompressionWorker::new(1);
        let n = MAX_PARKED + 5;
        let mut tickets: Vec<Ticket> = (0..n).map(|k| w.submit(CompressionOp::Deflate, vec![k as u8; 32]).unwrap()).collect();
        // One thread answers in submit order, so waiting on the last parks all the others.
        let last = tickets.pop().unwrap();
        w.wait(last).unwrap();
        assert_eq!(w.parked.len(), MAX_PARKED);
        let mut rest = tickets.into_iter();
        for t in rest.by_ref().take(4) {
            let id = t.id();
            assert_eq!(w.wait(t), Err(IoError::UnknownTicket(id)));
        }
        for t in rest {
            assert!(w.wait(t).is_ok());
        }
        assert!(w.outstanding.is_empty());
        assert!(w.parked.is_empty());
    }

    #[test]
    fn garbage_inflate_reports_an_error() {
        let mut w = CompressionWorker::new(1);
        let err = w.request(CompressionOp::Inflate { limit: 1024 }, vec![1, 2, 3, 4, 5]).unwrap_err();
        assert!(matches!(err, IoError::Compression(_)));
    }
}
