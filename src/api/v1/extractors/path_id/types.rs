/**
 * Responsibility
 *  - リソースごとの「意味付き ID 型」を宣言する
 *  - animal と profile の UUID を handler の引数で取り違えないようにする
 */
use super::core::PathId;

pub enum AnimalTag {}
pub type AnimalId = PathId<AnimalTag>;

// profile is owned by the account service; only its id appears here
pub enum ProfileTag {}
pub type ProfileId = PathId<ProfileTag>;
