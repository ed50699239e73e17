#![no_main]

use std::collections::HashMap;

use chunkgen_core::Module;
use chunkgen_core::graph::{DependencyGraph, compute_chunks, sort_chunks};
use libfuzzer_sys::fuzz_target;

// Byte 0 picks the module count; each following pair is one edge.
fuzz_target!(|data: &[u8]| {
    let Some((&count, edges)) = data.split_first() else {
        return;
    };
    let count = usize::from(count % 48) + 1;

    let mut modules: Vec<Module> = (0..count).map(|i| Module::new(format!("m{i:02}"))).collect();
    for pair in edges.chunks_exact(2) {
        let from = usize::from(pair[0]) % count;
        let to = usize::from(pair[1]) % count;
        let target = format!("m{to:02}");
        modules[from] = modules[from].clone().depends_on(target);
    }

    let graph = DependencyGraph::from_modules(&modules).expect("ids are unique");
    let chunks = compute_chunks(&graph);
    let order = sort_chunks(&chunks).expect("chunk graph is acyclic");
    assert_eq!(order.len(), chunks.chunk_count());

    let position: HashMap<_, _> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    for &id in &order {
        for dep in chunks.dependencies(id) {
            assert!(position[&dep] < position[&id], "dependency emitted late");
        }
    }
});
