use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fds::{
    collect_files, replace_in_files, ConfirmAnswer, FdsConfig, FdsResult, Pattern, Prompt,
    ReplaceFlags, Replacement,
};
use std::{fs::File, io::Write, num::NonZeroUsize, sync::Mutex};
use tempfile::tempdir;

struct NoPrompt;

impl Prompt for NoPrompt {
    fn show(&mut self, _text: &str) -> FdsResult<()> {
        Ok(())
    }

    fn ask(&mut self, _question: &str, _valid: &[char]) -> FdsResult<char> {
        Ok('y')
    }
}

fn create_test_files(
    dir: &tempfile::TempDir,
    file_count: usize,
    lines_per_file: usize,
) -> std::io::Result<()> {
    for i in 0..file_count {
        let file_path = dir.path().join(format!("test_{}.txt", i));
        let mut file = File::create(file_path)?;
        for j in 0..lines_per_file {
            writeln!(
                file,
                "Line {} TODO: fix bug {} FIXME: optimize line {} NOTE: important task {}",
                j, j, j, j
            )?;
        }
    }
    Ok(())
}

fn bench_line_replace(c: &mut Criterion) {
    let line = b"Line 42 TODO: fix bug 42 FIXME: optimize line 42 NOTE: important task 42\n";
    let mut group = c.benchmark_group("line_replace");

    for (name, search, template) in [
        ("literal", "TODO", "DONE"),
        ("capture", r"bug (\d+)", "issue #$1"),
        ("insensitive", "(?i)note", "remark"),
    ] {
        let replacement = Replacement::compile(search, template, &ReplaceFlags::default())
            .expect("benchmark pattern compiles");
        group.bench_function(name, |b| {
            b.iter(|| replacement.replace_all(black_box(line)))
        });
    }

    group.finish();
}

fn bench_find_matches(c: &mut Criterion) {
    let pattern = Pattern::compile(r"\d+", false, false).expect("benchmark pattern compiles");
    let line = b"Line 42 TODO: fix bug 42 FIXME: optimize line 42 NOTE: important task 42\n";

    c.bench_function("find_matches_with_context", |b| {
        b.iter(|| pattern.find_matches("N", black_box(line), 50))
    });
}

fn bench_directory_workers(c: &mut Criterion) {
    let dir = tempdir().expect("temp dir");
    create_test_files(&dir, 50, 200).expect("test files");
    let files = collect_files(dir.path(), &[]).expect("collect files");

    // Replacing a word with itself leaves the files unchanged between iterations
    let replacement = Replacement::compile("TODO", "TODO", &ReplaceFlags::default())
        .expect("benchmark pattern compiles");
    let prompt = Mutex::new(NoPrompt);

    let mut group = c.benchmark_group("directory_workers");
    for workers in [1, 2, 4, 8] {
        let options = FdsConfig {
            workers: NonZeroUsize::new(workers).expect("non-zero"),
            ..FdsConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(workers), &options, |b, options| {
            b.iter(|| {
                replace_in_files(
                    &files,
                    &replacement,
                    options,
                    &prompt,
                    &mut ConfirmAnswer::default(),
                )
            })
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = bench_line_replace, bench_find_matches, bench_directory_workers
}
criterion_main!(benches);
