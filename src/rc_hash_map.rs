//! A map of values shared by a counted number of users, where values nobody uses any more are dropped in bulk.

use core::{
	borrow::Borrow,
	hash::{BuildHasher, Hash},
};
use hashbrown::{
	hash_map::{DefaultHashBuilder, DrainFilter, Entry},
	HashMap,
};
use num_traits::{CheckedAdd, CheckedSub, One, Zero};

pub struct RcHashMap<K, C, V, S = DefaultHashBuilder>(HashMap<K, (C, V), S>)
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: BuildHasher;
impl<K, C, V, S> Default for RcHashMap<K, C, V, S>
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: Default + BuildHasher,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, C, V, S> RcHashMap<K, C, V, S>
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: BuildHasher,
{
	#[must_use]
	pub fn new() -> Self
	where
		S: Default,
	{
		Self(HashMap::with_hasher(S::default()))
	}

	/// Counts one more user of `k`'s value, creating the value first if there is none (including released ones).
	pub fn acquire_or_insert_with<F: FnOnce() -> V>(&mut self, k: K, v: F) -> Result<&mut V, CountSaturatedError> {
		match self.0.entry(k) {
			Entry::Occupied(occupied) => {
				let (c, v) = occupied.into_mut();
				*c = c.checked_add(&C::one()).ok_or(CountSaturatedError)?;
				Ok(v)
			}
			Entry::Vacant(vacant) => {
				let (_, v) = vacant.insert((C::one(), v()));
				Ok(v)
			}
		}
	}

	/// Counts one user fewer of `k`'s value. The value stays available until [`drain_released`](`RcHashMap::drain_released`).
	pub fn release<Q: ?Sized>(&mut self, k: &Q) -> Result<Option<&mut V>, CountSaturatedError>
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		match self.0.get_mut(k) {
			Some((c, v)) => {
				*c = c.checked_sub(&C::one()).ok_or(CountSaturatedError)?;
				Ok(Some(v))
			}
			None => Ok(None),
		}
	}

	/// Removes and yields all entries without users.
	pub fn drain_released(&mut self) -> DrainReleased<'_, K, C, V> {
		DrainReleased(self.0.drain_filter(DrainReleased::released_filter as fn(&K, &mut (C, V)) -> bool))
	}

	/// Number of entries, including released ones not yet drained.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn capacity(&self) -> usize {
		self.0.capacity()
	}
}

pub struct DrainReleased<'a, K, C, V>(DrainFilter<'a, K, (C, V), fn(&K, &mut (C, V)) -> bool>);
impl<'a, K, C, V> DrainReleased<'a, K, C, V>
where
	C: Zero,
{
	fn released_filter(_: &K, (c, _): &mut (C, V)) -> bool {
		c.is_zero()
	}
}
impl<'a, K, C, V> Iterator for DrainReleased<'a, K, C, V> {
	type Item = (K, V);

	fn next(&mut self) -> Option<Self::Item> {
		self.0.next().map(|(k, (_, v))| (k, v))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.0.size_hint()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSaturatedError;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn released_values_survive_until_drained() {
		let mut map = RcHashMap::<&str, u8, u32>::new();
		map.acquire_or_insert_with("a", || 1).unwrap();
		map.acquire_or_insert_with("a", || unreachable!()).unwrap();
		map.acquire_or_insert_with("b", || 2).unwrap();

		assert_eq!(map.release("a").unwrap(), Some(&mut 1));
		assert_eq!(map.drain_released().count(), 0);

		map.release("a").unwrap();
		map.release("b").unwrap();
		let mut drained: Vec<_> = map.drain_released().collect();
		drained.sort_unstable();
		assert_eq!(drained, vec![("a", 1), ("b", 2)]);
		assert!(map.is_empty());
	}

	#[test]
	fn reacquiring_a_released_value_reuses_it() {
		let mut map = RcHashMap::<u32, u8, &str>::new();
		map.acquire_or_insert_with(7, || "first").unwrap();
		map.release(&7).unwrap();

		assert_eq!(*map.acquire_or_insert_with(7, || "second").unwrap(), "first");
		assert_eq!(map.drain_released().count(), 0);
	}

	#[test]
	fn counts_saturate() {
		let mut map = RcHashMap::<u32, u8, ()>::new();
		assert_eq!(map.release(&0), Ok(None));
		map.acquire_or_insert_with(0, || ()).unwrap();
		map.release(&0).unwrap();
		assert_eq!(map.release(&0).map(|_| ()), Err(CountSaturatedError));

		for _ in 0..u8::MAX {
			map.acquire_or_insert_with(1, || ()).unwrap();
		}
		assert!(map.acquire_or_insert_with(1, || ()).is_err());
	}
}
