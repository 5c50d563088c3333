//! parallel batch coordination: every image is an independent unit of work on a rayon pool, and
//! the per-image results are folded into a single total in whatever order they complete.

use std::{
    collections::HashSet,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
};

use rayon::{Scope, ThreadPool, ThreadPoolBuilder};

use crate::{
    MaskError, Result,
    generate::{MaskedImage, generate_mask, mask_path},
};

/// outcome of a whole batch. only `total_on` is meaningful to callers of [`process_batch`], the
/// remaining counters are for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// sum of the on-pixel counts of every image that was masked successfully
    pub total_on: u64,
    pub saved: usize,
    pub failed: usize,
    /// images which were never started because the batch was cancelled
    pub skipped: usize,
}

impl BatchSummary {
    fn record(&mut self, image_path: &Path, completion: Completion) {
        match completion {
            Completion::Done(Ok(masked)) => {
                log::info!("Processed mask saved to {:?}", masked.output);
                self.total_on += masked.on_count;
                self.saved += 1;
            }
            Completion::Done(Err(_)) => self.failed += 1,
            Completion::Skipped => {
                log::debug!("Skipping {:?}, batch was cancelled", image_path);
                self.skipped += 1;
            }
        }
    }
}

/// stops a running batch from starting any further images. images already being processed are
/// allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Completion {
    Done(Result<MaskedImage>),
    Skipped,
}

#[derive(Default)]
pub struct BatchCoordinator {
    /// `None` schedules onto the global rayon pool, or onto the caller's pool when called from
    /// one of its workers
    pool: Option<ThreadPool>,
    cancel: CancelHandle,
}

impl BatchCoordinator {
    /// builds a coordinator with its own worker pool. `threads` of `None` lets rayon size the
    /// pool from the available parallelism.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.unwrap_or(0))
            .thread_name(|i| format!("highmask-worker-{}", i))
            .build()?;

        log::debug!("Built worker pool with {} threads", pool.current_num_threads());

        Ok(Self {
            pool: Some(pool),
            cancel: CancelHandle::default(),
        })
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// masks every image in `image_paths` into `output_dir` and sums the on-pixel counts.
    ///
    /// may be called from any thread, including a worker of the pool the images are scheduled on.
    pub fn run(&self, image_paths: &[PathBuf], output_dir: &Path) -> BatchSummary {
        self.run_with(image_paths, output_dir, generate_mask)
    }

    fn run_with<F>(&self, image_paths: &[PathBuf], output_dir: &Path, job: F) -> BatchSummary
    where
        F: Fn(&Path, &Path) -> Result<MaskedImage> + Sync,
    {
        log::info!("Processing {} images in parallel", image_paths.len());

        let mut summary = BatchSummary::default();

        // two inputs with the same stem would race on one mask file, so only the first keeps it
        let mut claimed = HashSet::new();
        let mut pending = Vec::with_capacity(image_paths.len());
        for image_path in image_paths {
            let output = mask_path(image_path, output_dir);
            if claimed.contains(&output) {
                let error = MaskError::DuplicateOutput {
                    path: image_path.clone(),
                    output,
                };
                log::error!("Error processing image {:?}: {}", image_path, error);
                summary.failed += 1;
            } else {
                claimed.insert(output);
                pending.push(image_path.as_path());
            }
        }

        // a worker of the scheduling pool must not block on the channel: it would hold the slot
        // its own jobs need. it joins the scope instead, which lets it run them.
        let nested = self.on_worker_thread();
        let (sender, receiver) = mpsc::channel();
        let cancel = &self.cancel;
        let job = &job;

        self.in_place_scope(|scope| {
            for image_path in pending {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    let completion = if cancel.is_cancelled() {
                        Completion::Skipped
                    } else {
                        Completion::Done(mask_one(job, image_path, output_dir))
                    };
                    if sender.send((image_path, completion)).is_err() {
                        log::debug!(
                            "Result for {:?} dropped, batch stopped collecting",
                            image_path
                        );
                    }
                });
            }

            // only the per-job senders should keep the channel open
            drop(sender);

            if !nested {
                for (image_path, completion) in receiver.iter() {
                    summary.record(image_path, completion);
                }
            }
        });

        // every job has finished and dropped its sender by now, so this only drains
        for (image_path, completion) in receiver.iter() {
            summary.record(image_path, completion);
        }

        if summary.failed > 0 || summary.skipped > 0 {
            log::info!(
                "{} saved, {} failed, {} skipped",
                summary.saved,
                summary.failed,
                summary.skipped
            );
        }
        log::info!(
            "Total pixels where mask is fully on across all images: {}",
            summary.total_on
        );

        summary
    }

    fn on_worker_thread(&self) -> bool {
        match &self.pool {
            Some(pool) => pool.current_thread_index().is_some(),
            None => rayon::current_thread_index().is_some(),
        }
    }

    fn in_place_scope<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&Scope<'scope>) -> R,
    {
        match &self.pool {
            Some(pool) => pool.in_place_scope(op),
            None => rayon::in_place_scope(op),
        }
    }
}

/// runs the job for one image, turning a panic into an ordinary failure so that it cannot take
/// down the worker or the batch.
fn mask_one<F>(job: &F, image_path: &Path, output_dir: &Path) -> Result<MaskedImage>
where
    F: Fn(&Path, &Path) -> Result<MaskedImage>,
{
    panic::catch_unwind(AssertUnwindSafe(|| job(image_path, output_dir))).unwrap_or_else(|_| {
        log::error!("Error processing image {:?}: worker panicked", image_path);
        Err(MaskError::Panicked {
            path: image_path.to_path_buf(),
        })
    })
}

/// masks every image on the global rayon pool, or on the caller's pool when called from inside
/// one, and returns the total number of on pixels.
pub fn process_batch(image_paths: &[PathBuf], output_dir: &Path) -> u64 {
    BatchCoordinator::default()
        .run(image_paths, output_dir)
        .total_on
}
