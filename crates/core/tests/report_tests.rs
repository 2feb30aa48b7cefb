//! Integration tests for the ranking report over a bootstrapped database

use std::fs;
use tempfile::TempDir;

use imdb_loader_core::{
    Bootstrapper, LoadConfig, RankingReport, ReportError, SchemaRegistry, Store, TableName,
    normalize_sentinel_nulls,
};

fn write_artifact(config: &LoadConfig, table: TableName, lines: &[&str]) {
    fs::create_dir_all(&config.data_dir).unwrap();
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(config.artifact_path(table), contents).unwrap();
}

/// Bootstrap a database from the given movies and movie genres
fn bootstrapped(dir: &TempDir, movies: &[&str], genres: &[&str]) -> LoadConfig {
    let config = LoadConfig::builder()
        .database(dir.path().join("movies.db"))
        .data_dir(dir.path().join("data"))
        .report_output(dir.path().join("query_results.csv"))
        .build()
        .unwrap();

    let mut movie_lines = vec!["id,name,year,rank"];
    movie_lines.extend_from_slice(movies);
    let mut genre_lines = vec!["movie_id,genre"];
    genre_lines.extend_from_slice(genres);

    write_artifact(&config, TableName::Actors, &["id,first_name,last_name,gender"]);
    write_artifact(&config, TableName::Movies, &movie_lines);
    write_artifact(&config, TableName::Directors, &["id,first_name,last_name"]);
    write_artifact(&config, TableName::Roles, &["actor_id,movie_id,role"]);
    write_artifact(&config, TableName::MoviesGenres, &genre_lines);
    write_artifact(&config, TableName::DirectorsGenres, &["director_id,genre,prob"]);

    let registry = SchemaRegistry::imdb();
    Bootstrapper::new(&config, &registry).bootstrap().unwrap();
    config
}

fn run_report(config: &LoadConfig) -> String {
    let store = Store::open(&config.database).unwrap();
    RankingReport::new(config.report.top_n)
        .generate(&store, &config.report.output)
        .unwrap();
    fs::read_to_string(&config.report.output).unwrap()
}

#[test]
fn test_top_three_per_genre() {
    let dir = TempDir::new().unwrap();
    let config = bootstrapped(
        &dir,
        &[
            "1,Alpha,2000,7.5",
            "2,Beta,2001,9.1",
            "3,Gamma,2002,6.0",
            "4,Delta,2003,8.0",
            "5,Epsilon,2004,6.5",
        ],
        &["1,Drama", "2,Drama", "3,Drama", "4,Drama", "5,Comedy"],
    );

    assert_eq!(
        run_report(&config),
        "Comedy,\"Epsilon\",2004,6.5\n\
         Drama,\"Beta\",2001,9.1\n\
         Drama,\"Delta\",2003,8.0\n\
         Drama,\"Alpha\",2000,7.5\n"
    );
}

#[test]
fn test_sentinel_rank_excluded() {
    let dir = TempDir::new().unwrap();
    let config = bootstrapped(
        &dir,
        &["1,\"Alpha\",2000,8.5", "2,\"Beta\",1999,NULL"],
        &["1,Drama", "2,Drama"],
    );

    assert_eq!(run_report(&config), "Drama,\"Alpha\",2000,8.5\n");

    // normalizing does not change what is reported
    let store = Store::open(&config.database).unwrap();
    normalize_sentinel_nulls(&store, "NULL").unwrap();
    drop(store);
    assert_eq!(run_report(&config), "Drama,\"Alpha\",2000,8.5\n");
}

#[test]
fn test_sentinel_does_not_take_a_ranking_slot() {
    let dir = TempDir::new().unwrap();
    let config = bootstrapped(
        &dir,
        &[
            "1,A,2000,5.0",
            "2,B,2001,NULL",
            "3,C,2002,4.0",
            "4,D,2003,3.0",
        ],
        &["1,Drama", "2,Drama", "3,Drama", "4,Drama"],
    );

    let report = run_report(&config);
    assert_eq!(report.lines().count(), 3);
    assert!(report.ends_with("Drama,\"D\",2003,3.0\n"));
}

#[test]
fn test_names_with_quotes_and_commas() {
    let dir = TempDir::new().unwrap();
    let config = bootstrapped(
        &dir,
        &["1,\"The \"\"Kid\"\", Revisited\",1921,8.3"],
        &["1,Drama"],
    );

    assert_eq!(
        run_report(&config),
        "Drama,\"The \"\"Kid\"\", Revisited\",1921,8.3\n"
    );
}

#[test]
fn test_output_overwritten_each_run() {
    let dir = TempDir::new().unwrap();
    let config = bootstrapped(&dir, &["1,Alpha,2000,8.5"], &["1,Drama"]);
    fs::write(&config.report.output, "stale line\nanother stale line\n").unwrap();

    assert_eq!(run_report(&config), "Drama,\"Alpha\",2000,8.5\n");
    assert_eq!(run_report(&config), "Drama,\"Alpha\",2000,8.5\n");
}

#[test]
fn test_report_on_empty_database_fails() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("empty.db")).unwrap();

    let err = RankingReport::default()
        .generate(&store, &dir.path().join("query_results.csv"))
        .unwrap_err();
    assert!(matches!(err, ReportError::Query(_)));
    assert!(err.user_message().contains("Hint:"));
    assert!(!dir.path().join("query_results.csv").exists());
}
