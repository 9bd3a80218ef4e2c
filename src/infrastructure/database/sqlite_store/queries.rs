pub(super) const INSERT_BOOK: &str = r#"
INSERT INTO books (id, title, author, genre, image_url, user_id, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub(super) const SELECT_BOOK_BY_ID: &str = r#"
SELECT b.id, b.title, b.author, b.genre, b.image_url, b.user_id, b.created_at,
       p.firstname, p.lastname, p.avatar_url
FROM books b
LEFT JOIN profiles p ON p.id = b.user_id
WHERE b.id = ?1
"#;

pub(super) const SELECT_BOOKS: &str = r#"
SELECT b.id, b.title, b.author, b.genre, b.image_url, b.user_id, b.created_at,
       p.firstname, p.lastname, p.avatar_url
FROM books b
LEFT JOIN profiles p ON p.id = b.user_id
ORDER BY b.created_at DESC
"#;

pub(super) const UPDATE_BOOK: &str = r#"
UPDATE books
SET title = COALESCE(?2, title),
    author = COALESCE(?3, author),
    genre = COALESCE(?4, genre),
    image_url = COALESCE(?5, image_url)
WHERE id = ?1
"#;

pub(super) const DELETE_BOOK: &str = r#"
DELETE FROM books
WHERE id = ?1
"#;

pub(super) const SELECT_PROFILE_BY_ID: &str = r#"
SELECT id, firstname, lastname, avatar_url, account_type, updated_at
FROM profiles
WHERE id = ?1
"#;

pub(super) const SELECT_PROFILES: &str = r#"
SELECT id, firstname, lastname, avatar_url, account_type, updated_at
FROM profiles
ORDER BY updated_at DESC
"#;

pub(super) const UPDATE_PROFILE: &str = r#"
UPDATE profiles
SET firstname = COALESCE(?2, firstname),
    lastname = COALESCE(?3, lastname),
    avatar_url = COALESCE(?4, avatar_url),
    account_type = COALESCE(?5, account_type),
    updated_at = ?6
WHERE id = ?1
"#;

pub(super) const SELECT_FAVORITE: &str = r#"
SELECT user_id, book_id, favorited, updated_at
FROM favorites
WHERE user_id = ?1 AND book_id = ?2
"#;

pub(super) const UPSERT_FAVORITE: &str = r#"
INSERT INTO favorites (user_id, book_id, favorited, updated_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT (book_id, user_id)
DO UPDATE SET favorited = excluded.favorited, updated_at = excluded.updated_at
"#;

pub(super) const SELECT_FAVORITED_BOOKS: &str = r#"
SELECT b.id, b.title, b.author, b.genre, b.image_url, b.user_id, b.created_at,
       p.firstname, p.lastname, p.avatar_url
FROM favorites f
JOIN books b ON b.id = f.book_id
LEFT JOIN profiles p ON p.id = b.user_id
WHERE f.user_id = ?1 AND f.favorited = 1
ORDER BY f.updated_at DESC
"#;
