use crate::EvaluationError;

use std::sync::{Arc, Mutex, PoisonError};

/// A handle to the single host resource (e.g. the parametric
/// document) that every evaluation mutates.
///
/// All access happens inside [`with_exclusive`], so inputs are
/// applied, recomputed and read back in one critical section.
///
/// [`with_exclusive`]: SharedResource::with_exclusive
#[derive(Debug, Default)]
pub struct SharedResource<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for SharedResource<T> {
    fn clone(&self) -> Self {
        SharedResource {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedResource<T> {
    pub fn new(resource: T) -> SharedResource<T> {
        SharedResource {
            inner: Arc::new(Mutex::new(resource)),
        }
    }

    /// Runs `f` with exclusive access to the resource.
    ///
    /// # Errors
    /// Returns an [`EvaluationError`] if a previous holder
    /// panicked while holding the resource.
    ///
    /// # Examples
    /// ```
    /// use biomorph::SharedResource;
    ///
    /// let document = SharedResource::new(vec![1.0, 2.0]);
    /// let handle = document.clone();
    ///
    /// handle.with_exclusive(|values| values.push(3.0)).unwrap();
    /// let total = document.with_exclusive(|values| values.iter().sum::<f64>()).unwrap();
    /// assert_eq!(total, 6.0);
    /// ```
    pub fn with_exclusive<F, U>(&self, f: F) -> Result<U, EvaluationError>
    where
        F: FnOnce(&mut T) -> U,
    {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| EvaluationError::new("shared evaluation resource is poisoned"))?;
        Ok(f(&mut *guard))
    }

    /// Reads the resource, even if a previous holder panicked.
    ///
    /// Meant for metadata that a failed evaluation cannot
    /// corrupt, such as the number of controls.
    pub fn inspect<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&T) -> U,
    {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }

    /// Returns `true` if a previous holder panicked, after
    /// which [`with_exclusive`] always fails.
    ///
    /// [`with_exclusive`]: SharedResource::with_exclusive
    pub fn is_poisoned(&self) -> bool {
        self.inner.is_poisoned()
    }
}
