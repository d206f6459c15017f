//! # Component Pool
//!
//! Pre-allocated, fixed-stride component storage.
//!
//! The pool uses a direct-index strategy:
//! - Storage for every slot is reserved when the pool is created
//! - Access is O(1) via entity slot index, with no indirection layer
//! - The pool does not know which slots hold a value; the owning world's
//!   signatures do

// SAFETY: This module manages a raw allocation and constructs values in it.
// Every unsafe block documents the invariant it relies on.
#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::{self, NonNull};

use super::component::Component;

/// Destructor for one component, given the address of its slot.
pub type DropFn = unsafe fn(*mut u8);

unsafe fn drop_slot_as<T>(slot: *mut u8) {
    // SAFETY: The caller passes the address of an initialized `T`.
    unsafe { ptr::drop_in_place(slot.cast::<T>()) }
}

/// Untyped storage for a single component type.
///
/// One pool exists per component type actually used by a world. Slot `i`
/// belongs to the entity with slot index `i`.
///
/// # Example
///
/// ```rust
/// use tessera_core::ComponentPool;
///
/// let mut pool = ComponentPool::for_type::<u64>(16);
/// assert_eq!(pool.stride(), 8);
///
/// // SAFETY: the pool stores u64 and slot 3 is uninitialized.
/// unsafe {
///     pool.write(3, 42_u64);
///     assert_eq!(*pool.get::<u64>(3), 42);
/// }
/// ```
pub struct ComponentPool {
    /// Start of the buffer (dangling but aligned when nothing is allocated).
    data: NonNull<u8>,
    /// Layout of one element, padded to its alignment.
    item: Layout,
    /// Number of slots.
    capacity: usize,
    /// Destructor run by [`ComponentPool::drop_slot`].
    drop_fn: Option<DropFn>,
    /// Name of the stored type, for diagnostics.
    type_name: &'static str,
}

impl ComponentPool {
    /// Creates a pool with a fixed element layout and capacity.
    ///
    /// The stride is `item` padded to its alignment. Zero-sized elements and
    /// zero capacity allocate nothing.
    ///
    /// # Arguments
    ///
    /// * `item` - Layout of one component instance
    /// * `capacity` - Number of slots (maximum entity count)
    /// * `drop_fn` - Destructor for one instance, if it needs one
    ///
    /// # Panics
    ///
    /// Panics if `stride * capacity` overflows `isize`.
    #[must_use]
    pub fn new(item: Layout, capacity: usize, drop_fn: Option<DropFn>) -> Self {
        let item = item.pad_to_align();
        let data = match Self::buffer_layout(item, capacity) {
            Some(buffer) if buffer.size() > 0 => {
                // SAFETY: `buffer` has a non-zero size.
                let raw = unsafe { alloc::alloc(buffer) };
                NonNull::new(raw).unwrap_or_else(|| alloc::handle_alloc_error(buffer))
            }
            Some(_) => Self::dangling(item),
            None => panic!(
                "component pool of {capacity} x {} bytes exceeds the address space",
                item.size()
            ),
        };

        Self {
            data,
            item,
            capacity,
            drop_fn,
            type_name: "<raw>",
        }
    }

    /// Creates a pool sized and aligned for `T`, dropping values as `T`.
    ///
    /// # Panics
    ///
    /// Panics if `size_of::<T>() * capacity` overflows `isize`.
    #[must_use]
    pub fn for_type<T: Component>(capacity: usize) -> Self {
        let drop_fn: Option<DropFn> = if std::mem::needs_drop::<T>() {
            Some(drop_slot_as::<T>)
        } else {
            None
        };
        let mut pool = Self::new(Layout::new::<T>(), capacity, drop_fn);
        pool.type_name = std::any::type_name::<T>();
        tracing::debug!(
            "Allocated component pool for {}: {} slots x {} bytes",
            pool.type_name,
            capacity,
            pool.stride()
        );
        pool
    }

    fn buffer_layout(item: Layout, capacity: usize) -> Option<Layout> {
        let size = item.size().checked_mul(capacity)?;
        Layout::from_size_align(size, item.align()).ok()
    }

    fn dangling(item: Layout) -> NonNull<u8> {
        // An address equal to the alignment is non-null and suitably aligned.
        NonNull::new(item.align() as *mut u8).unwrap_or(NonNull::dangling())
    }

    /// Returns the distance in bytes between consecutive slots.
    #[inline]
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.item.size()
    }

    /// Returns the number of slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the name of the stored type (`"<raw>"` for untyped pools).
    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the address of slot `index`.
    ///
    /// The memory may or may not hold an initialized value; the pool does not
    /// track which.
    ///
    /// # Returns
    ///
    /// The slot address, or None if `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn slot_ptr(&self, index: usize) -> Option<NonNull<u8>> {
        if index >= self.capacity {
            return None;
        }
        // SAFETY: `index < capacity`, so the offset stays inside the buffer
        // (or is zero for zero-sized elements).
        let slot = unsafe { self.data.as_ptr().add(index * self.stride()) };
        NonNull::new(slot)
    }

    /// # Safety
    ///
    /// `index` must be less than `capacity`.
    #[inline]
    unsafe fn typed_slot<T>(&self, index: usize) -> *mut T {
        debug_assert!(index < self.capacity, "slot {index} out of bounds");
        debug_assert!(std::mem::size_of::<T>() <= self.item.size());
        debug_assert!(std::mem::align_of::<T>() <= self.item.align());
        // SAFETY: The caller guarantees `index < capacity`.
        unsafe { self.data.as_ptr().add(index * self.stride()).cast::<T>() }
    }

    /// Moves `value` into slot `index`, returning a reference to it.
    ///
    /// Any value already in the slot is overwritten without being dropped.
    ///
    /// # Safety
    ///
    /// - `index` must be less than [`capacity`](Self::capacity).
    /// - `T` must be the type this pool was created for.
    /// - The slot must not hold a value that still needs dropping.
    #[inline]
    pub unsafe fn write<T>(&mut self, index: usize, value: T) -> &mut T {
        // SAFETY: The caller guarantees bounds and type; the slot is aligned
        // because the buffer and stride share `T`'s alignment.
        unsafe {
            let slot = self.typed_slot::<T>(index);
            slot.write(value);
            &mut *slot
        }
    }

    /// Returns a reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// - `index` must be less than [`capacity`](Self::capacity).
    /// - The slot must hold an initialized `T`.
    #[inline]
    #[must_use]
    pub unsafe fn get<T>(&self, index: usize) -> &T {
        // SAFETY: The caller guarantees an initialized `T` at this slot.
        unsafe { &*self.typed_slot::<T>(index) }
    }

    /// Returns a mutable reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// - `index` must be less than [`capacity`](Self::capacity).
    /// - The slot must hold an initialized `T`.
    #[inline]
    #[must_use]
    pub unsafe fn get_mut<T>(&mut self, index: usize) -> &mut T {
        // SAFETY: The caller guarantees an initialized `T` at this slot, and
        // `&mut self` guarantees exclusive access.
        unsafe { &mut *self.typed_slot::<T>(index) }
    }

    /// Moves the value out of slot `index`, leaving the slot logically empty.
    ///
    /// # Safety
    ///
    /// - `index` must be less than [`capacity`](Self::capacity).
    /// - The slot must hold an initialized `T`, which must not be used again.
    #[inline]
    #[must_use]
    pub unsafe fn read<T>(&mut self, index: usize) -> T {
        // SAFETY: The caller guarantees an initialized `T` and gives up the
        // slot's copy.
        unsafe { self.typed_slot::<T>(index).read() }
    }

    /// Runs the destructor of the value in slot `index`.
    ///
    /// # Safety
    ///
    /// - `index` must be less than [`capacity`](Self::capacity).
    /// - The slot must hold an initialized value of the pool's type, which
    ///   must not be used again.
    #[inline]
    pub unsafe fn drop_slot(&mut self, index: usize) {
        if let Some(drop_fn) = self.drop_fn {
            debug_assert!(index < self.capacity, "slot {index} out of bounds");
            // SAFETY: The caller guarantees bounds and an initialized value.
            unsafe { drop_fn(self.data.as_ptr().add(index * self.stride())) }
        }
    }
}

impl Drop for ComponentPool {
    fn drop(&mut self) {
        if let Some(buffer) = Self::buffer_layout(self.item, self.capacity) {
            if buffer.size() > 0 {
                // SAFETY: `data` was returned by `alloc` with this same layout.
                unsafe { alloc::dealloc(self.data.as_ptr(), buffer) }
            }
        }
    }
}

impl fmt::Debug for ComponentPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentPool")
            .field("type_name", &self.type_name)
            .field("stride", &self.stride())
            .field("capacity", &self.capacity)
            .finish()
    }
}
