// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Section-graph traversals.

Traversals never mark the morphology itself; callers pass an external
[`RoaringBitmap`] visited set so concurrent readers can walk the same frozen
morphology.
*/

use super::{Morphology, Section, SectionId};
use roaring::RoaringBitmap;

impl Morphology {
    /// Depth-first walk over the sections reachable from `start`.
    ///
    /// Sections already present in `visited` are skipped and every visited
    /// section is added to it, so loops terminate.
    pub fn visit_depth_first<F>(&self, start: SectionId, visited: &mut RoaringBitmap, mut visit: F)
    where
        F: FnMut(&Section),
    {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(section) = self.sections().get(id as usize) else {
                continue;
            };
            if !visited.insert(id) {
                continue;
            }
            visit(section);
            // Reverse so the first child is visited first.
            for &child in section.children.iter().rev() {
                if !visited.contains(child) {
                    stack.push(child);
                }
            }
        }
    }

    /// Every section id in depth-first order from the roots.
    ///
    /// Sections unreachable from any root (cycles without a parentless entry)
    /// follow in index order, each starting its own walk.
    pub fn depth_first_order(&self) -> Vec<SectionId> {
        let mut visited = RoaringBitmap::new();
        let mut order = Vec::with_capacity(self.number_sections());
        for &root in self.roots() {
            self.visit_depth_first(root, &mut visited, |s| order.push(s.index));
        }
        for section in self.sections() {
            if !visited.contains(section.index) {
                self.visit_depth_first(section.index, &mut visited, |s| order.push(s.index));
            }
        }
        order
    }

    /// `start` and every section downstream of it.
    pub fn subtree(&self, start: SectionId) -> Vec<SectionId> {
        let mut visited = RoaringBitmap::new();
        let mut ids = Vec::new();
        self.visit_depth_first(start, &mut visited, |s| ids.push(s.index));
        ids
    }

    /// Number of parent hops from the nearest root for every section.
    ///
    /// Sections unreachable from a root get `None`.
    pub fn branch_orders(&self) -> Vec<Option<u32>> {
        let mut orders = vec![None; self.number_sections()];
        let mut visited = RoaringBitmap::new();
        let mut queue: std::collections::VecDeque<(SectionId, u32)> =
            self.roots().iter().map(|&r| (r, 0)).collect();
        while let Some((id, order)) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            orders[id as usize] = Some(order);
            if let Some(section) = self.sections().get(id as usize) {
                for &child in &section.children {
                    if !visited.contains(child) {
                        queue.push_back((child, order + 1));
                    }
                }
            }
        }
        orders
    }
}
