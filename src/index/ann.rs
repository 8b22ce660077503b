/// An append-only index over f32 vectors answering "which stored rows have
/// the largest inner product with this query".
///
/// Implementations never remove rows. Vertices that retire during the
/// solve stay physically present and keep appearing in results; filtering
/// them is the caller's job ([`super::FeatureStore`] keeps the active
/// bitmap). This is what forces the expanding search in the store: a
/// result list of size s may be arbitrarily polluted by retired rows.
pub trait AnnIndex {
    /// Appends a row under the given id.
    ///
    /// Ids are dense and must arrive in order: `id` must equal [`AnnIndex::len`]
    /// at the time of the call.
    fn add(&mut self, id: usize, vector: &[f32]);

    /// Returns up to `nr_results` `(id, inner_product)` pairs in
    /// descending inner-product order. May include the query row itself
    /// and retired rows.
    fn search(&self, query: &[f32], nr_results: usize) -> Vec<(usize, f32)>;

    /// Number of rows stored so far.
    fn len(&self) -> usize;

    /// Returns `true` if no rows have been added.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
