//! # Batch Generator
//!
//! Renders one certificate per roster entry and reports how many succeeded.
//!
//! Every render is a pure function of (template, elements, preview, name),
//! so attendees are rendered in parallel with rayon. Results are collected
//! into a roster-indexed vector, so the output is always in roster order no
//! matter which render finishes first.
//!
//! ## Failure policy
//!
//! | Failure | Effect |
//! |---------|--------|
//! | empty roster, no name element | `PreconditionFailed`, nothing runs |
//! | no template, preview not ready | `TemplateUnavailable`, nothing runs |
//! | one attendee fails to render | attendee recorded in `failures`, batch continues |
//! | cancelled | attendees not yet started are left out, `cancelled` is set |

use log::{info, warn};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::design::{Roster, TextElement};
use crate::error::{CertError, Result};
use crate::geometry::{PreviewSize, Scale};
use crate::render::{Rasterizer, RenderedCertificate, Template};

/// Shared flag for abandoning a batch between attendees.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Reported after each attendee finishes, successfully or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub attendee: String,
}

pub struct GenerateOptions<'a> {
    /// Render attendees on the rayon pool.
    pub parallel: bool,
    pub cancel: Option<CancelToken>,
    pub progress: Option<&'a (dyn Fn(BatchProgress) + Sync)>,
}

impl Default for GenerateOptions<'_> {
    fn default() -> Self {
        Self {
            parallel: true,
            cancel: None,
            progress: None,
        }
    }
}

impl GenerateOptions<'_> {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

/// An attendee whose certificate could not be produced.
#[derive(Debug)]
pub struct AttendeeFailure {
    pub index: usize,
    pub attendee: String,
    pub error: CertError,
}

#[derive(Debug)]
pub struct BatchOutcome {
    /// Successful renders in roster order.
    pub certificates: Vec<RenderedCertificate>,
    /// Failed attendees in roster order.
    pub failures: Vec<AttendeeFailure>,
    /// Roster size.
    pub requested: usize,
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.certificates.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "generated {} of {} certificates",
            self.succeeded(),
            self.requested
        )
    }
}

enum Slot {
    Done(RenderedCertificate),
    Failed(CertError),
    NotStarted,
}

pub struct BatchGenerator<'a> {
    rasterizer: Rasterizer<'a>,
    template: Option<&'a Template>,
    elements: &'a [TextElement],
    preview: PreviewSize,
}

impl<'a> BatchGenerator<'a> {
    pub fn new(
        rasterizer: Rasterizer<'a>,
        template: Option<&'a Template>,
        elements: &'a [TextElement],
        preview: PreviewSize,
    ) -> Self {
        Self {
            rasterizer,
            template,
            elements,
            preview,
        }
    }

    /// Refuse batches that cannot produce anything.
    pub fn check(&self, roster: &Roster) -> Result<()> {
        if roster.is_empty() {
            return Err(CertError::PreconditionFailed(
                "the attendee roster is empty".into(),
            ));
        }
        if !self.elements.iter().any(TextElement::is_name) {
            return Err(CertError::PreconditionFailed(
                "the design has no attendee name element".into(),
            ));
        }
        let template = self
            .template
            .ok_or_else(|| CertError::TemplateUnavailable("no template image loaded".into()))?;
        if Scale::resolve(template.size(), self.preview).is_none() {
            return Err(CertError::TemplateUnavailable(
                "preview size is not ready".into(),
            ));
        }
        Ok(())
    }

    /// Render every attendee. Individual failures do not stop the batch.
    pub fn run(&self, roster: &Roster, options: &GenerateOptions<'_>) -> Result<BatchOutcome> {
        self.check(roster)?;

        let render = |name: &str| {
            self.rasterizer
                .render(self.template, self.elements, self.preview, name)
        };
        Ok(render_all(roster.names(), options, &render))
    }
}

/// Per-attendee render step, shared across the rayon pool.
type RenderFn<'r> = dyn Fn(&str) -> Result<RenderedCertificate> + Sync + 'r;

fn render_slot(
    name: &str,
    total: usize,
    completed: &AtomicUsize,
    options: &GenerateOptions<'_>,
    render: &RenderFn<'_>,
) -> Slot {
    if options.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
        return Slot::NotStarted;
    }

    let slot = match render(name) {
        Ok(certificate) => Slot::Done(certificate),
        Err(e) => {
            warn!("certificate for {:?} failed: {}", name, e);
            Slot::Failed(e)
        }
    };

    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some(progress) = options.progress {
        progress(BatchProgress {
            completed: done,
            total,
            attendee: name.to_string(),
        });
    }
    slot
}

/// Render `names` in order through `render`, keeping successes and failures
/// at their roster positions.
fn render_all(
    names: &[String],
    options: &GenerateOptions<'_>,
    render: &RenderFn<'_>,
) -> BatchOutcome {
    let total = names.len();
    let completed = AtomicUsize::new(0);
    info!(
        "generating {} certificates ({})",
        total,
        if options.parallel { "parallel" } else { "sequential" }
    );

    let slots: Vec<Slot> = if options.parallel {
        names
            .par_iter()
            .map(|name| render_slot(name, total, &completed, options, render))
            .collect()
    } else {
        names
            .iter()
            .map(|name| render_slot(name, total, &completed, options, render))
            .collect()
    };

    let mut outcome = BatchOutcome {
        certificates: Vec::with_capacity(total),
        failures: Vec::new(),
        requested: total,
        cancelled: false,
    };
    for (index, (slot, name)) in slots.into_iter().zip(names).enumerate() {
        match slot {
            Slot::Done(certificate) => outcome.certificates.push(certificate),
            Slot::Failed(error) => outcome.failures.push(AttendeeFailure {
                index,
                attendee: name.clone(),
                error,
            }),
            Slot::NotStarted => outcome.cancelled = true,
        }
    }

    info!("{}", outcome.summary());
    outcome
}
