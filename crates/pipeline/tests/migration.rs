//! End-to-end migration runs against a real database.
//!
//! Fixtures are written in the legacy export dialect (comment banner,
//! escaped single quotes, bare `msg` values) to a temporary directory.

use std::path::{Path, PathBuf};

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use coolforum_core::config::MigrationConfig;
use coolforum_core::error::CoreError;
use coolforum_core::types::{DbId, Timestamp};
use coolforum_db::repositories::{
    CategoryRepo, ConversationRepo, ForumUserRepo, MessageRepo, PostRepo, ThreadRepo,
};
use coolforum_pipeline::config::DataFiles;
use coolforum_pipeline::error::MigrateError;
use coolforum_pipeline::stage::Stage;
use coolforum_pipeline::Pipeline;
use sqlx::PgPool;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const BANNER: &str = "// phpMyAdmin JSON Export\n// version 3.3.7\n// Database: 'coolforum'\n\n";

const CATEGORIES: &str = r#"[
{"pk": 1, "model": "forum.category", "fields": {"title": "Annonces", "subtitle": "", "slug": "annonces"}},
{"pk": 2, "model": "forum.category", "fields": {"title": "Discussions", "subtitle": "Tout et rien", "slug": "discussions"}},
{"pk": 3, "model": "forum.category", "fields": {"title": "Jeux", "subtitle": "", "slug": "jeux"}},
{"pk": 4, "model": "forum.category", "fields": {"title": "Musique", "subtitle": "", "slug": "musique"}},
{"pk": 5, "model": "forum.category", "fields": {"title": "Cinema", "subtitle": "", "slug": "cinema"}},
{"pk": 6, "model": "forum.category", "fields": {"title": "Sport", "subtitle": "", "slug": "sport"}},
{"pk": 7, "model": "forum.category", "fields": {"title": "Divers", "subtitle": "", "slug": "divers"}}
]"#;

// 2005-01-01, 2009-01-01, 2011-01-01, 2011-06-01 UTC
const T2005: i64 = 1_104_537_600;
const T2009: i64 = 1_230_768_000;
const T2011: i64 = 1_293_840_000;
const T2011_JUNE: i64 = 1_306_886_400;

fn user(id: DbId, login: &str) -> String {
    format!(
        "{{\"userid\": {id}, \"login\": \"{login}\", \"usermail\": \"{login}@example.org\", \"registerdate\": {T2005}, \"userlogo\": \"\", \"usercitation\": \"\", \"usersite\": \"\"}}"
    )
}

fn users_export(extra: &[String]) -> String {
    let extra: String = extra.iter().map(|u| format!(", {u}")).collect();
    format!(
        "{BANNER}[{{\"userid\": 1, \"login\": \"Jean Dupont\", \"usermail\": \"jean@example.org\", \"registerdate\": {T2005}, \"userlogo\": \"jean.png\", \"usercitation\": \"L\\'important c&#39;est de participer\", \"usersite\": \"http://jean.example.org\"}}, \
{{\"userid\": 2, \"login\": \"marie\", \"usermail\": \"marie@example.org\", \"registerdate\": {T2005}, \"userlogo\": \"\", \"usercitation\": null, \"usersite\": \"\"}}, \
{{\"userid\": 3, \"login\": \"lurker\", \"usermail\": \"lurker@example.org\", \"registerdate\": {T2005}, \"userlogo\": \"\", \"usercitation\": 42, \"usersite\": \"\"}}, \
{{\"userid\": 4, \"login\": \"paul\", \"usermail\": \"paul@example.org\", \"registerdate\": {T2005}, \"userlogo\": \"p.gif\", \"usercitation\": \"\", \"usersite\": \"\"}}{extra}]\n"
    )
}

fn thread(id: DbId, forum: DbId, subject: &str, author: DbId, sticky: i32) -> String {
    format!(
        "{{\"idtopic\": {id}, \"idforum\": {forum}, \"sujet\": \"{subject}\", \"idmembre\": {author}, \"icone\": \"icon{id}\", \"nbvues\": {}, \"postit\": {sticky}}}",
        id * 3
    )
}

fn threads_export(extra: &[String]) -> String {
    let mut records = vec![
        thread(10, 1, "Bienvenue", 1, 1),
        thread(11, 6, "Le match d\\'hier", 2, 0),
        thread(12, 7, "!!!", 4, 0),
        thread(13, 1, "Bienvenue", 4, 0),
        thread(14, 2, "Sans r&eacute;ponse", 1, 0),
    ];
    records.extend_from_slice(extra);
    format!("{BANNER}[{}]\n", records.join(", "))
}

fn post(id: DbId, parent: DbId, author: DbId, msg: &str, date: i64) -> String {
    format!(
        "{{\"idpost\": {id}, \"parent\": {parent}, \"idmembre\": {author}, \"msg\": {msg}, \"date\": {date}}}"
    )
}

fn posts_export(extra: &[String]) -> String {
    let mut records = vec![
        post(100, 10, 1, "\"<p>Bonjour &amp; bienvenue</p> [size=2]petit[/size]\"", T2011),
        post(101, 10, 2, "\"Merci !\"", T2009),
        post(102, 11, 2, "12345", T2009),
        post(103, 999, 1, "\"perdu\"", T2011),
        post(104, 12, 4, "\"<b>Gras</b>\"", T2011),
        post(105, 13, 4, "\"Encore\"", T2011_JUNE),
    ];
    records.extend_from_slice(extra);
    format!("{BANNER}[{}]\n", records.join(", "))
}

fn pm(dest: DbId, exp: DbId, msg: &str, date: i64) -> String {
    format!("{{\"iddest\": {dest}, \"idexp\": {exp}, \"msg\": \"{msg}\", \"date\": {date}}}")
}

fn messages_export(extra: &[String]) -> String {
    let mut records = vec![
        pm(2, 1, "Salut Marie", T2009),
        pm(1, 2, "Salut Jean", T2011),
        pm(4, 4, "Note perso", T2011),
        pm(4, 1, "Hello Paul", T2011_JUNE),
    ];
    records.extend_from_slice(extra);
    format!("{BANNER}[{}]\n", records.join(", "))
}

struct Dataset {
    dir: TempDir,
    files: DataFiles,
}

impl Dataset {
    fn new() -> Self {
        Self::with_threads(threads_export(&[]))
    }

    fn with_threads(threads: String) -> Self {
        Self::with_exports(users_export(&[]), threads, posts_export(&[]), messages_export(&[]))
    }

    fn with_exports(users: String, threads: String, posts: String, messages: String) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles::in_dir(dir.path());
        std::fs::write(&files.categories, CATEGORIES).unwrap();
        std::fs::write(&files.users, users).unwrap();
        std::fs::write(&files.threads, threads).unwrap();
        std::fs::write(&files.posts, posts).unwrap();
        std::fs::write(&files.private_messages, messages).unwrap();
        Self { dir, files }
    }

    fn credentials(&self) -> PathBuf {
        self.dir.path().join("new_users.json")
    }

    fn pipeline(&self, pool: &PgPool) -> Pipeline {
        Pipeline::new(
            pool.clone(),
            self.files.clone(),
            self.credentials(),
            MigrationConfig::default(),
        )
    }
}

fn at(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn read_lines(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_run_imports_and_reconciles(pool: PgPool) {
    let data = Dataset::new();
    let report = data.pipeline(&pool).run().await.unwrap();

    assert_eq!(report.categories.created, 7);
    assert_eq!(report.users.created, 4);
    assert_eq!(report.threads.created, 5);
    assert_eq!(report.posts.created, 5);
    assert_eq!(report.posts.dropped, 1);
    assert_eq!(report.messages.created, 3);
    assert_eq!(report.messages.dropped, 1);
    assert_eq!(report.conversations_created, 2);
    assert_eq!(report.users_deleted, 1);
    assert_eq!(report.users_deactivated, 1);
    assert_eq!(report.conversations_deleted, 0);

    // Users
    let jean = ForumUserRepo::find_by_id(&pool, 1).await.unwrap().unwrap();
    assert_eq!(jean.username, "Jean_Dupont");
    assert_eq!(jean.logo, "logo/jean.png");
    assert_eq!(jean.quote, "L'important c'est de participer");
    assert_eq!(jean.date_joined, at(T2005));
    let marie = ForumUserRepo::find_by_id(&pool, 2).await.unwrap().unwrap();
    assert_eq!(marie.quote, "");
    assert!(!marie.is_active);
    assert!(ForumUserRepo::find_by_id(&pool, 3).await.unwrap().is_none());

    // Credentials side file
    let lines = read_lines(&data.credentials());
    assert_eq!(lines.len(), 1);
    let issued = lines[0].as_object().unwrap();
    let names: Vec<&str> = issued.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Jean_Dupont", "lurker", "marie", "paul"]);

    // Threads
    let t10 = ThreadRepo::find_by_id(&pool, 10).await.unwrap().unwrap();
    assert_eq!(t10.category_id, 1);
    assert!(t10.is_sticky);
    assert_eq!(t10.icon, "icon10.gif");
    assert_eq!(t10.view_count, 30);
    assert_eq!(t10.slug, "bienvenue");
    assert_eq!(t10.modified, at(T2011));
    assert_eq!(ThreadRepo::list_contributors(&pool, 10).await.unwrap(), vec![1, 2]);

    let t11 = ThreadRepo::find_by_id(&pool, 11).await.unwrap().unwrap();
    assert_eq!(t11.category_id, 7);
    assert_eq!(t11.title, "Le match d'hier");
    assert_eq!(t11.slug, "le-match-dhier");

    let t12 = ThreadRepo::find_by_id(&pool, 12).await.unwrap().unwrap();
    assert_eq!(t12.category_id, 5);
    assert_eq!(t12.slug, "untitled");

    let t13 = ThreadRepo::find_by_id(&pool, 13).await.unwrap().unwrap();
    assert_eq!(t13.slug, "bienvenue-1");
    assert_eq!(t13.modified, at(T2011_JUNE));

    let t14 = ThreadRepo::find_by_id(&pool, 14).await.unwrap().unwrap();
    assert_eq!(t14.title, "Sans réponse");
    assert_eq!(t14.slug, "sans-reponse");

    // Posts
    let p100 = PostRepo::find_by_id(&pool, 100).await.unwrap().unwrap();
    assert_eq!(p100.content_plain, "Bonjour & bienvenue [size=11]petit[/size]");
    let p102 = PostRepo::find_by_id(&pool, 102).await.unwrap().unwrap();
    assert_eq!(p102.content_plain, "12345");
    assert!(PostRepo::find_by_id(&pool, 103).await.unwrap().is_none());
    assert_eq!(report.posts_per_category.get(&1), Some(&3));
    assert_eq!(report.posts_per_category.get(&7), Some(&1));
    assert_eq!(report.posts_per_category.get(&5), Some(&1));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cession_tokens_are_distinct_and_sorted_in_file_order(pool: PgPool) {
    let data = Dataset::new();
    data.pipeline(&pool).run().await.unwrap();

    let mut tokens = Vec::new();
    for id in [10, 11, 12, 13, 14] {
        tokens.push(ThreadRepo::find_by_id(&pool, id).await.unwrap().unwrap().cession_token);
    }
    let mut sorted = tokens.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(tokens, sorted);
    assert_eq!(ThreadRepo::list_cession_tokens(&pool).await.unwrap().len(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn conversations_are_symmetric(pool: PgPool) {
    let data = Dataset::new();
    data.pipeline(&pool).run().await.unwrap();

    assert_eq!(ConversationRepo::count(&pool).await.unwrap(), 2);
    let memberships = ConversationRepo::list_memberships(&pool).await.unwrap();
    let jean_marie = memberships
        .iter()
        .find(|(_, user)| *user == 2)
        .map(|(conversation, _)| *conversation)
        .unwrap();

    let messages = MessageRepo::list_by_conversation(&pool, jean_marie).await.unwrap();
    assert_eq!(messages.len(), 2);
    let conversation = ConversationRepo::find_by_id(&pool, jean_marie).await.unwrap().unwrap();
    assert_eq!(conversation.modified, at(T2011));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sequences_continue_after_imported_ids(pool: PgPool) {
    let data = Dataset::new();
    let report = data.pipeline(&pool).run().await.unwrap();

    assert_eq!(report.next_ids["forum_users"], 5);
    assert_eq!(report.next_ids["categories"], 8);
    assert_eq!(report.next_ids["threads"], 15);
    assert_eq!(report.next_ids["posts"], 106);

    let id: DbId = sqlx::query_scalar(
        "INSERT INTO forum_users (username, password_hash) VALUES ('nouveau', 'x') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(id, 5);
}

// ---------------------------------------------------------------------------
// Re-runs
// ---------------------------------------------------------------------------

const IMPORT_STAGES: [Stage; 7] = [
    Stage::Categories,
    Stage::Users,
    Stage::Threads,
    Stage::Posts,
    Stage::ThreadReconcile,
    Stage::PrivateMessages,
    Stage::ConversationReconcile,
];

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_import_creates_nothing(pool: PgPool) {
    let data = Dataset::new();

    let mut first = data.pipeline(&pool);
    for stage in IMPORT_STAGES {
        first.run_stage(stage).await.unwrap();
    }
    let slug_before = ThreadRepo::find_by_id(&pool, 13).await.unwrap().unwrap().slug;

    let mut second = data.pipeline(&pool);
    for stage in IMPORT_STAGES {
        second.run_stage(stage).await.unwrap();
    }
    let report = second.report();
    assert_eq!(report.categories.created, 0);
    assert_eq!(report.users.created, 0);
    assert_eq!(report.users.skipped, 4);
    assert_eq!(report.threads.created, 0);
    assert_eq!(report.posts.created, 0);
    assert_eq!(report.posts.skipped, 5);
    assert_eq!(report.messages.created, 0);
    assert_eq!(report.messages.skipped, 3);
    assert_eq!(report.conversations_created, 0);

    assert_eq!(PostRepo::count(&pool).await.unwrap(), 5);
    assert_eq!(MessageRepo::count(&pool).await.unwrap(), 3);
    assert_eq!(ConversationRepo::count(&pool).await.unwrap(), 2);
    assert_eq!(
        ThreadRepo::find_by_id(&pool, 13).await.unwrap().unwrap().slug,
        slug_before
    );

    // Second run issues no passwords.
    let lines = read_lines(&data.credentials());
    assert_eq!(lines.len(), 2);
    assert!(lines[1].as_object().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_rerun_only_recreates_deleted_accounts(pool: PgPool) {
    let data = Dataset::new();
    data.pipeline(&pool).run().await.unwrap();
    let report = data.pipeline(&pool).run().await.unwrap();

    assert_eq!(report.users.created, 1);
    assert_eq!(report.users_deleted, 1);
    assert_eq!(report.threads.created, 0);
    assert_eq!(ForumUserRepo::list_ids(&pool).await.unwrap(), vec![1, 2, 4]);
}

// ---------------------------------------------------------------------------
// Housekeeping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleted_account_takes_its_conversations_along(pool: PgPool) {
    // lurker (3) never posts but exchanges messages with Jean.
    let data = Dataset::with_exports(
        users_export(&[]),
        threads_export(&[]),
        posts_export(&[]),
        messages_export(&[
            pm(3, 1, "Tu es la ?", T2009),
            pm(1, 3, "Oui", T2011),
        ]),
    );

    let first = data.pipeline(&pool).run().await.unwrap();
    assert_eq!(first.messages.created, 5);
    assert_eq!(first.users_deleted, 1);
    assert_eq!(first.conversations_deleted, 1);
    let conversations = ConversationRepo::count(&pool).await.unwrap();
    let messages = MessageRepo::count(&pool).await.unwrap();
    assert_eq!((conversations, messages), (2, 3));
    let memberships = ConversationRepo::list_memberships(&pool).await.unwrap();
    assert!(memberships.iter().all(|(_, user)| *user != 3));

    for _ in 0..2 {
        let report = data.pipeline(&pool).run().await.unwrap();
        assert_eq!(report.users_deleted, 1);
        assert_eq!(report.conversations_deleted, 1);
        assert_eq!(ConversationRepo::count(&pool).await.unwrap(), conversations);
        assert_eq!(MessageRepo::count(&pool).await.unwrap(), messages);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn users_left_without_posts_by_a_cascade_are_deleted(pool: PgPool) {
    // sophie (5) only ever replied in a thread opened by lurker (3), who
    // has no posts of their own.
    let data = Dataset::with_exports(
        users_export(&[user(5, "sophie")]),
        threads_export(&[thread(15, 1, "Orphelin", 3, 0)]),
        posts_export(&[post(106, 15, 5, "\"Premier !\"", T2011)]),
        messages_export(&[]),
    );
    let report = data.pipeline(&pool).run().await.unwrap();

    assert_eq!(report.users.created, 5);
    assert_eq!(report.threads.created, 6);
    assert_eq!(report.users_deleted, 2);
    assert!(ThreadRepo::find_by_id(&pool, 15).await.unwrap().is_none());
    assert!(PostRepo::find_by_id(&pool, 106).await.unwrap().is_none());
    assert!(ForumUserRepo::find_by_id(&pool, 5).await.unwrap().is_none());
    assert_eq!(ForumUserRepo::list_ids(&pool).await.unwrap(), vec![1, 2, 4]);
}

// ---------------------------------------------------------------------------
// Failures and ordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn thread_with_unknown_author_aborts(pool: PgPool) {
    let data = Dataset::with_threads(threads_export(&[thread(15, 1, "Fant&ocirc;me", 99, 0)]));
    let result = data.pipeline(&pool).run().await;

    assert_matches!(
        result,
        Err(MigrateError::Core(CoreError::NotFound { entity: "user", id: 99 }))
    );
    assert!(ThreadRepo::list_category_ids(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stage_cannot_run_before_prerequisites(pool: PgPool) {
    let data = Dataset::new();
    let mut pipeline = data.pipeline(&pool);

    pipeline.run_stage(Stage::Categories).await.unwrap();
    assert_matches!(
        pipeline.run_stage(Stage::Threads).await,
        Err(MigrateError::StageOrder {
            stage: Stage::Threads,
            missing: Stage::Users
        })
    );
    assert_eq!(CategoryRepo::list_ids(&pool).await.unwrap().len(), 7);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn group_conversation_is_not_reused(pool: PgPool) {
    let data = Dataset::new();
    let mut pipeline = data.pipeline(&pool);
    pipeline.run_stage(Stage::Categories).await.unwrap();
    pipeline.run_stage(Stage::Users).await.unwrap();

    let group = ConversationRepo::create_with_participants(&pool, &[1, 2, 4])
        .await
        .unwrap();
    pipeline.run_stage(Stage::PrivateMessages).await.unwrap();

    assert_eq!(pipeline.report().conversations_created, 2);
    assert!(MessageRepo::list_by_conversation(&pool, group)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_export_aborts(pool: PgPool) {
    let data = Dataset::new();
    std::fs::write(&data.files.users, "// truncated dump\n").unwrap();

    let result = data.pipeline(&pool).run().await;
    assert_matches!(result, Err(MigrateError::Core(CoreError::MalformedExport(_))));
}
