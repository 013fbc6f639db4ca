//! AND/OR merging of posting lists sorted by document id.
//!
//! Both merges are lazy single forward passes over their inputs.

use crate::index::Posting;
use std::cmp::Ordering;
use std::iter::Peekable;

pub struct PostingsMerger;

impl PostingsMerger {
    /// Postings whose document occurs in both inputs. Yields the posting from `p1`.
    pub fn intersection<A, B>(p1: A, p2: B) -> Intersection<A::IntoIter, B::IntoIter>
    where
        A: IntoIterator<Item = Posting>,
        B: IntoIterator<Item = Posting>,
    {
        Intersection { left: p1.into_iter().peekable(), right: p2.into_iter().peekable() }
    }

    /// Every document in either input, once. On a shared document the posting from `p1` wins.
    pub fn union<A, B>(p1: A, p2: B) -> Union<A::IntoIter, B::IntoIter>
    where
        A: IntoIterator<Item = Posting>,
        B: IntoIterator<Item = Posting>,
    {
        Union { left: p1.into_iter().peekable(), right: p2.into_iter().peekable() }
    }
}

pub struct Intersection<A: Iterator<Item = Posting>, B: Iterator<Item = Posting>> {
    left: Peekable<A>,
    right: Peekable<B>,
}

impl<A, B> Iterator for Intersection<A, B>
where
    A: Iterator<Item = Posting>,
    B: Iterator<Item = Posting>,
{
    type Item = Posting;

    fn next(&mut self) -> Option<Posting> {
        loop {
            let l = self.left.peek()?.document_id;
            let r = self.right.peek()?.document_id;
            match l.cmp(&r) {
                Ordering::Equal => {
                    self.right.next();
                    return self.left.next();
                }
                Ordering::Less => {
                    self.left.next();
                }
                Ordering::Greater => {
                    self.right.next();
                }
            }
        }
    }
}

pub struct Union<A: Iterator<Item = Posting>, B: Iterator<Item = Posting>> {
    left: Peekable<A>,
    right: Peekable<B>,
}

impl<A, B> Iterator for Union<A, B>
where
    A: Iterator<Item = Posting>,
    B: Iterator<Item = Posting>,
{
    type Item = Posting;

    fn next(&mut self) -> Option<Posting> {
        let l = self.left.peek().map(|p| p.document_id);
        let r = self.right.peek().map(|p| p.document_id);
        match (l, r) {
            (Some(l), Some(r)) => match l.cmp(&r) {
                Ordering::Less => self.left.next(),
                Ordering::Greater => self.right.next(),
                Ordering::Equal => {
                    self.right.next();
                    self.left.next()
                }
            },
            (Some(_), None) => self.left.next(),
            (None, Some(_)) => self.right.next(),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocId;

    fn postings(ids: &[DocId]) -> Vec<Posting> {
        ids.iter().map(|&document_id| Posting { document_id, term_frequency: 1 }).collect()
    }

    fn ids(iter: impl Iterator<Item = Posting>) -> Vec<DocId> {
        iter.map(|p| p.document_id).collect()
    }

    #[test]
    fn intersection_keeps_shared_documents() {
        let a = postings(&[1, 3, 5, 7, 9]);
        let b = postings(&[2, 3, 4, 9, 11]);
        assert_eq!(ids(PostingsMerger::intersection(a.clone(), b.clone())), vec![3, 9]);
        assert_eq!(ids(PostingsMerger::intersection(b, a)), vec![3, 9]);
    }

    #[test]
    fn union_emits_each_document_once_in_order() {
        let a = postings(&[1, 3, 5]);
        let b = postings(&[2, 3, 8, 13]);
        assert_eq!(ids(PostingsMerger::union(a.clone(), b.clone())), vec![1, 2, 3, 5, 8, 13]);
        assert_eq!(ids(PostingsMerger::union(b, a)), vec![1, 2, 3, 5, 8, 13]);
    }

    #[test]
    fn empty_inputs() {
        let a = postings(&[1, 2]);
        assert!(ids(PostingsMerger::intersection(a.clone(), Vec::new())).is_empty());
        assert_eq!(ids(PostingsMerger::union(Vec::new(), a)), vec![1, 2]);
    }

    #[test]
    fn output_sizes_are_bounded() {
        let a = postings(&[0, 4, 6, 10, 12, 20]);
        let b = postings(&[4, 5, 6, 21]);
        let and = PostingsMerger::intersection(a.clone(), b.clone()).count();
        let or = PostingsMerger::union(a.clone(), b.clone()).count();
        assert!(and <= a.len().min(b.len()));
        assert!(or >= a.len().max(b.len()));
        assert!(or <= a.len() + b.len());
    }

    #[test]
    fn shared_document_keeps_left_posting() {
        let a = vec![Posting { document_id: 3, term_frequency: 7 }];
        let b = vec![Posting { document_id: 3, term_frequency: 1 }];
        assert_eq!(PostingsMerger::union(a.clone(), b.clone()).next(), Some(a[0]));
        assert_eq!(PostingsMerger::intersection(a.clone(), b).next(), Some(a[0]));
    }
}
